//! Native-currency distribution and collection across a set of wallets,
//! with private bundle submission on the bundle network.

pub mod app;
pub mod blockchain;
pub mod cli;
pub mod config;
pub mod execution;
pub mod observability;
pub mod relay;
pub mod transfer;

pub use app::App;
pub use config::AppConfig;
