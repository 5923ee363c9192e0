//! Revert payload decoding for simulation reports.

use alloy::primitives::hex;

/// Human-readable reason a simulated transaction failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// Payload decoded as UTF-8 text.
    Text(String),
    /// Payload kept verbatim because it is not UTF-8.
    Hex(String),
}

impl std::fmt::Display for RevertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevertReason::Text(text) => f.write_str(text),
            RevertReason::Hex(raw) => write!(f, "Hex data: {}", raw),
        }
    }
}

/// Decode a hex revert payload as UTF-8, falling back to the raw hex.
pub fn decode_revert(payload: &str) -> RevertReason {
    match hex::decode(payload.trim()) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => RevertReason::Text(text),
            Err(_) => RevertReason::Hex(payload.to_string()),
        },
        Err(_) => RevertReason::Hex(payload.to_string()),
    }
}
