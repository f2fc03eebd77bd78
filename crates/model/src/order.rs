use {
    crate::signature::EcdsaSignature,
    alloy::primitives::{Address, U256},
};

/// The fields of a limit order that are covered by its hash.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct OrderData {
    pub maker: Address,
    pub from_token: Address,
    pub to_token: Address,
    pub amount_in: U256,
    pub amount_out_min: U256,
    pub recipient: Address,
    /// Unix timestamp in seconds after which the order can't be filled.
    pub deadline: U256,
}

impl OrderData {
    /// Whether the deadline lies strictly after `now` (unix seconds).
    pub fn is_valid_at(&self, now: u64) -> bool {
        self.deadline > U256::from(now)
    }
}

/// The argument list submitted to the order book: the order data followed by
/// the `(v, r, s)` signature triple.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OrderArgs {
    pub data: OrderData,
    pub signature: EcdsaSignature,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_must_be_in_the_future() {
        let order = OrderData {
            deadline: U256::from(1_000),
            ..Default::default()
        };
        assert!(order.is_valid_at(999));
        assert!(!order.is_valid_at(1_000));
        assert!(!order.is_valid_at(1_001));
    }
}
