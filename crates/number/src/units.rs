use {
    alloy::primitives::{
        U256,
        utils::{ParseUnits, Unit},
    },
    anyhow::{Context, Result, bail},
};

pub trait EthUnit: std::marker::Sized {
    /// Returns the current wei amount.
    fn wei(self) -> U256;

    /// Returns the current Mwei amount as wei (i.e. 1e6 wei).
    fn mwei(self) -> U256 {
        self.wei() * Unit::MWEI.wei()
    }

    /// Returns the current Gwei amount as wei (i.e. 1e9 wei).
    fn gwei(self) -> U256 {
        self.wei() * Unit::GWEI.wei()
    }

    /// Returns the current Eth amount as wei (i.e. 1e18 wei).
    fn eth(self) -> U256 {
        self.wei() * Unit::ETHER.wei()
    }
}

impl EthUnit for u64 {
    fn wei(self) -> U256 {
        U256::from(self)
    }
}

impl EthUnit for u128 {
    fn wei(self) -> U256 {
        U256::from(self)
    }
}

/// Parses a human readable decimal amount (e.g. `"1.5"`) into base units of a
/// token with the given number of decimals.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256> {
    let parsed = alloy::primitives::utils::parse_units(amount.trim(), decimals)
        .with_context(|| format!("invalid amount {amount:?} for {decimals} decimals"))?;
    match parsed {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => bail!("negative amount {amount:?}"),
    }
}

/// Parses an Ether amount into wei.
pub fn parse_ether(amount: &str) -> Result<U256> {
    parse_units(amount, 18)
}

/// Formats base units as a decimal string with the given number of decimals.
///
/// Trailing zeros of the fractional part are removed but at least one
/// fractional digit is kept, i.e. one Ether formats as `"1.0"`.
pub fn format_units(value: U256, decimals: u8) -> String {
    let base = U256::from(10).pow(U256::from(decimals));
    let whole = value / base;
    let fraction = value % base;

    let fraction = format!(
        "{:0>width$}",
        fraction.to_string(),
        width = usize::from(decimals)
    );
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Formats wei as an Ether amount.
pub fn format_ether(value: U256) -> String {
    format_units(value, 18)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_amounts() {
        assert_eq!(parse_units("1.5", 6).unwrap(), U256::from(1_500_000));
        assert_eq!(parse_units(" 42 ", 0).unwrap(), U256::from(42));
        assert_eq!(parse_ether("1").unwrap(), 1u64.eth());
        assert_eq!(parse_ether("0.000000001").unwrap(), 1u64.gwei());
    }

    #[test]
    fn rejects_invalid_amounts() {
        assert!(parse_units("abc", 18).is_err());
        assert!(parse_units("-1", 18).is_err());
    }

    #[test]
    fn formats_like_a_wallet() {
        assert_eq!(format_ether(1u64.eth()), "1.0");
        assert_eq!(format_units(U256::from(1_500_000), 6), "1.5");
        assert_eq!(format_units(U256::from(1), 6), "0.000001");
        assert_eq!(format_units(U256::ZERO, 18), "0.0");
        assert_eq!(format_units(U256::from(7), 0), "7.0");
    }
}
