use {
    crate::conversions::pow10,
    num::{BigRational, Signed, Zero},
};

/// Number of significant digits prices are displayed with.
pub const DEFAULT_SIGNIFICANT_DIGITS: u32 = 6;

/// Renders a rational with the given number of significant digits, rounding
/// half up and dropping trailing zeros (`1234.5678` becomes `"1234.57"`,
/// `123456789` becomes `"123457000"`).
pub fn to_significant(value: &BigRational, significant_digits: u32) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    let sign = if value.is_negative() { "-" } else { "" };
    let value = value.abs();
    let significant_digits = i64::from(significant_digits.max(1));

    // Find `exponent` such that 10^(exponent-1) <= value < 10^exponent.
    let digits_of = |n: &num::BigInt| i64::try_from(n.to_string().len()).unwrap_or(i64::MAX);
    let mut exponent = digits_of(value.numer()) - digits_of(value.denom());
    while pow10(exponent) <= value {
        exponent += 1;
    }
    while pow10(exponent - 1) > value {
        exponent -= 1;
    }

    let shift = significant_digits - exponent;
    let half = BigRational::new(1.into(), 2.into());
    let digits = (value * pow10(shift) + half)
        .floor()
        .to_integer()
        .to_string();

    if shift <= 0 {
        return format!("{sign}{digits}{}", "0".repeat(shift.unsigned_abs() as usize));
    }

    let shift = shift as usize;
    let (whole, fraction) = if digits.len() > shift {
        let (whole, fraction) = digits.split_at(digits.len() - shift);
        (whole.to_string(), fraction.to_string())
    } else {
        ("0".to_string(), format!("{}{digits}", "0".repeat(shift - digits.len())))
    };
    match fraction.trim_end_matches('0') {
        "" => format!("{sign}{whole}"),
        fraction => format!("{sign}{whole}.{fraction}"),
    }
}

#[cfg(test)]
mod tests {
    use {super::*, num::BigInt};

    fn ratio(numer: i64, denom: i64) -> BigRational {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn rounds_to_significant_digits() {
        assert_eq!(to_significant(&ratio(12_345_678, 10_000), 6), "1234.57");
        assert_eq!(
            to_significant(&ratio(123_456_789, 1_000_000_000_000), 6),
            "0.000123457"
        );
        assert_eq!(to_significant(&ratio(123_456_789, 1), 6), "123457000");
    }

    #[test]
    fn drops_trailing_zeros() {
        assert_eq!(to_significant(&ratio(2, 1), 6), "2");
        assert_eq!(to_significant(&ratio(1, 2), 6), "0.5");
        assert_eq!(to_significant(&ratio(1, 10), 6), "0.1");
        assert_eq!(to_significant(&ratio(100, 1), 6), "100");
    }

    #[test]
    fn rounds_half_up() {
        assert_eq!(to_significant(&ratio(25, 1), 1), "30");
        assert_eq!(to_significant(&ratio(1_999_995, 1_000_000), 6), "2");
        assert_eq!(to_significant(&ratio(1, 3), 6), "0.333333");
        assert_eq!(to_significant(&ratio(2, 3), 6), "0.666667");
    }

    #[test]
    fn handles_zero_and_negatives() {
        assert_eq!(to_significant(&ratio(0, 1), 6), "0");
        assert_eq!(to_significant(&ratio(-3, 2), 6), "-1.5");
    }
}
