//! Private bundle relay subsystem.
//!
//! # Data Flow
//! ```text
//! SignedTransfer list
//!     → types.rs (SignedBundle, JSON-RPC payloads)
//!     → client.rs (auth header over body, POST to relay)
//!         eth_callBundle → SimulationResponse
//!         eth_sendBundle → SubmissionOutcome (accepted / rejected / ambiguous)
//!     → revert.rs (readable reasons for failed simulated transactions)
//! ```

pub mod client;
pub mod revert;
pub mod types;

pub use client::{sign_payload, BundleRelay, FlashbotsRelay, SIGNATURE_HEADER};
pub use revert::{decode_revert, RevertReason};
pub use types::{
    RelayError, RelayResult, SignedBundle, SimulatedTransaction, SimulationResponse,
    SimulationResult, SubmissionOutcome,
};
