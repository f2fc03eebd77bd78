use {
    alloy::primitives::U256,
    num::{BigInt, BigRational, BigUint, bigint::Sign},
};

pub fn u256_to_big_uint(input: &U256) -> BigUint {
    BigUint::from_bytes_be(&input.to_be_bytes::<32>())
}

pub fn u256_to_big_int(input: &U256) -> BigInt {
    BigInt::from_biguint(Sign::Plus, u256_to_big_uint(input))
}

pub fn u256_to_big_rational(input: &U256) -> BigRational {
    BigRational::new(u256_to_big_int(input), 1.into())
}

/// Returns `10^exponent` as a rational, negative exponents included.
pub fn pow10(exponent: i64) -> BigRational {
    let power = num::pow(BigInt::from(10), exponent.unsigned_abs() as usize);
    if exponent >= 0 {
        BigRational::from_integer(power)
    } else {
        BigRational::new(1.into(), power)
    }
}
