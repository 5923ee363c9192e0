//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! AppConfig (keys, RPC URL)
//!     → wallet.rs (key loading, signing, local nonce counter)
//!     → client.rs (RPC connection with timeouts, broadcast + confirmation)
//!     → transaction.rs (fee params, planned transfer, sign to raw envelope)
//! ```
//!
//! # Security Constraints
//! - Private keys come only from the validated configuration
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::{BlockchainClient, ChainClient};
pub use transaction::{FeeParams, PlannedTransfer, SignedTransfer};
pub use types::{BlockchainError, BlockchainResult, ChainId, LatestBlock, TransferReceipt};
pub use wallet::{SignerRole, Wallet, WalletSet};
