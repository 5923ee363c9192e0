//! Transfer execution strategies.
//!
//! # Data Flow
//! ```text
//! TransferPlan
//!     → DirectExecutor  (sign + send each transfer, wait until mined)
//!     → BundleExecutor  (build → sign → simulate → submit to relay)
//!     → RunOutcome
//! ```
//!
//! The strategy is chosen once at startup from the connected chain id.

pub mod bundle;
pub mod direct;

use alloy::primitives::utils::format_ether;
use async_trait::async_trait;
use thiserror::Error;

use crate::blockchain::{BlockchainError, ChainId, PlannedTransfer, SignerRole, TransferReceipt};
use crate::relay::{RelayError, RevertReason};
use crate::transfer::TransferPlan;

pub use bundle::{inspect_simulation, BundleExecutor, BundleSettings};
pub use direct::DirectExecutor;

/// How transfers reach the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Ordinary transactions through the RPC endpoint.
    Direct,
    /// One signed bundle through the private relay.
    Bundle,
}

impl ExecutionMode {
    pub fn for_chain(chain_id: ChainId, bundle_chain_id: u64) -> Self {
        if chain_id.0 == bundle_chain_id {
            ExecutionMode::Bundle
        } else {
            ExecutionMode::Direct
        }
    }
}

/// Errors that end an operation.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Chain(#[from] BlockchainError),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;

/// A simulated transaction that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationFailure {
    pub tx_hash: Option<String>,
    pub reason: RevertReason,
}

/// Why a bundle run stopped before the relay accepted anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    EmptyBundle,
    SimulationError(String),
    SimulationFailed(Vec<SimulationFailure>),
    Rejected(String),
}

/// Result of executing a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Direct transfers, all mined.
    Sent(Vec<TransferReceipt>),
    BundleSubmitted {
        target_block: u64,
        bundle_hash: Option<String>,
        tx_links: Vec<String>,
    },
    Aborted(AbortReason),
    /// The relay gave no usable answer; the bundle may or may not land.
    Ambiguous { target_block: u64, reason: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Sent(_) | RunOutcome::BundleSubmitted { .. })
    }
}

/// A way of executing planned transfers.
#[async_trait]
pub trait TransferExecutor: Send + Sync {
    fn mode(&self) -> ExecutionMode;

    async fn execute(&self, plan: &TransferPlan) -> ExecutionResult<RunOutcome>;
}

/// Operator line for one transfer.
pub(crate) fn describe_transfer(transfer: &PlannedTransfer) -> String {
    let amount = format_ether(transfer.value);
    match transfer.signer {
        SignerRole::Funding => format!(
            "Distributed {} ETH (BNB) to {} / 成功分发 {} ETH（BNB） 到 {}",
            amount, transfer.to, amount, transfer.to
        ),
        SignerRole::Collection(_) => format!(
            "Collected {} ETH (BNB) from {} to {} / 已成功归集 {} ETH（BNB） 从 {} 到 {}",
            amount, transfer.from, transfer.to, amount, transfer.from, transfer.to
        ),
    }
}
