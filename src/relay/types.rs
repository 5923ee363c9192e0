//! Relay wire types, bundle container and error definitions.

use alloy::primitives::{hex, TxHash};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::blockchain::{BlockchainError, SignedTransfer};

pub const SEND_BUNDLE_METHOD: &str = "eth_sendBundle";
pub const CALL_BUNDLE_METHOD: &str = "eth_callBundle";

/// Errors talking to the relay.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay payload error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("relay authentication failed: {0}")]
    Auth(#[from] BlockchainError),

    #[error("invalid relay URL {0}")]
    InvalidUrl(String),

    #[error("relay returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

pub type RelayResult<T> = Result<T, RelayError>;

/// Ordered signed transactions submitted atomically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedBundle {
    pub transactions: Vec<SignedTransfer>,
}

impl SignedBundle {
    pub fn new(transactions: Vec<SignedTransfer>) -> Self {
        Self { transactions }
    }

    /// `0x`-prefixed raw transactions, in bundle order.
    pub fn raw_transactions(&self) -> Vec<String> {
        self.transactions
            .iter()
            .map(|tx| hex::encode_prefixed(&tx.raw))
            .collect()
    }

    pub fn tx_hashes(&self) -> Vec<TxHash> {
        self.transactions.iter().map(|tx| tx.tx_hash).collect()
    }
}

/// JSON-RPC request envelope. Field order is the wire order.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<P> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: [P; 1],
}

impl<P> JsonRpcRequest<P> {
    pub fn new(method: &'static str, params: P) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 1,
            method,
            params: [params],
        }
    }
}

/// Params of `eth_sendBundle`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBundleParams {
    pub txs: Vec<String>,
    pub block_number: String,
    pub builders: Vec<String>,
}

/// Params of `eth_callBundle`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallBundleParams {
    pub txs: Vec<String>,
    pub block_number: String,
    pub state_block_number: String,
}

/// Hex quantity encoding used for block numbers.
pub fn hex_quantity(value: u64) -> String {
    format!("{:#x}", value)
}

/// JSON-RPC error object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

/// JSON-RPC response envelope.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// Result of `eth_callBundle`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_hash: Option<String>,
    #[serde(default)]
    pub results: Vec<SimulatedTransaction>,
    /// Everything else the relay reports (coinbase diff, gas totals, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-transaction simulation result.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedTransaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revert: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type SimulationResponse = JsonRpcResponse<SimulationResult>;

/// Result of `eth_sendBundle`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendBundleResult {
    #[serde(default)]
    pub bundle_hash: Option<String>,
    #[serde(default)]
    pub bundle_transactions: Vec<BundleTransactionInfo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BundleTransactionInfo {
    pub hash: String,
}

/// Outcome of a bundle submission.
///
/// The caller must branch on all three: only `Accepted` means the relay
/// took the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted {
        bundle_hash: Option<String>,
        tx_hashes: Vec<String>,
    },
    Rejected(String),
    /// No usable answer (transport failure, unreadable body).
    Ambiguous(String),
}
