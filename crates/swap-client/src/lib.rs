pub mod arguments;
pub mod controllers;
pub mod notification;
pub mod onchain;
pub mod order;
pub mod pricing;
pub mod routing;
pub mod run;
pub mod sources;
pub mod token_list;
pub mod traits;
pub mod web3;

pub use run::{run, start};
