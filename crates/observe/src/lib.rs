//! This crate contains the code required to make the swap client observable:
//! initialization of the logging setup and a panic hook that routes panic
//! messages through `tracing`.
pub mod config;
pub mod panic_hook;
pub mod tracing;

pub use config::Config;
