pub mod conversions;
pub mod format;
pub mod units;
