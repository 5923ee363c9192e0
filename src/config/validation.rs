//! Configuration validation.
//!
//! Semantic checks that run after every value has been parsed:
//! - value ranges (gas limit, timeouts, concurrency)
//! - URLs and private keys are well formed
//! - the funding wallet is not also a collection wallet
//!
//! Returns all validation errors, not just the first.

use std::collections::HashSet;

use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;

use crate::config::schema::{AppConfig, PrivateKey};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{field} is not a valid URL: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("{0} is not a valid private key")]
    InvalidKey(String),

    #[error("at least one collection wallet key is required")]
    NoCollectionWallets,

    #[error("collection wallet #{0} uses the funding wallet key")]
    FundingKeyInCollection(usize),

    #[error("collection wallet #{0} duplicates an earlier key")]
    DuplicateCollectionKey(usize),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.fees.gas_limit == 0 {
        errors.push(ValidationError::NotPositive("GAS_LIMIT"));
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::NotPositive("RPC_TIMEOUT_SECS"));
    }
    if config.chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::NotPositive("CONFIRMATION_TIMEOUT_SECS"));
    }
    if config.chain.confirmation_poll_ms == 0 {
        errors.push(ValidationError::NotPositive("CONFIRMATION_POLL_MS"));
    }
    if config.report.balance_concurrency == 0 {
        errors.push(ValidationError::NotPositive("BALANCE_CONCURRENCY"));
    }

    check_url("RPC_URL", &config.chain.rpc_url, &mut errors);
    check_url("FLASHBOTS_RELAY_URL", &config.relay.url, &mut errors);

    check_key("FLASHBOTS_RELAY_SIGNING_KEY".to_string(), &config.keys.relay_signing_key, &mut errors);
    check_key("DISTRIBUTE_PRIVATE_KEY".to_string(), &config.keys.funding_key, &mut errors);

    if config.keys.collection_keys.is_empty() {
        errors.push(ValidationError::NoCollectionWallets);
    }

    let funding = config.keys.funding_key.normalized();
    let mut seen = HashSet::new();
    for (i, key) in config.keys.collection_keys.iter().enumerate() {
        check_key(format!("COLLECT_PRIVATE_KEY #{}", i), key, &mut errors);
        let normalized = key.normalized();
        if normalized == funding {
            errors.push(ValidationError::FundingKeyInCollection(i));
        }
        if !seen.insert(normalized) {
            errors.push(ValidationError::DuplicateCollectionKey(i));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if let Err(e) = value.parse::<url::Url>() {
        errors.push(ValidationError::InvalidUrl {
            field,
            reason: e.to_string(),
        });
    }
}

fn check_key(field: String, key: &PrivateKey, errors: &mut Vec<ValidationError>) {
    let hex = key.expose();
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.parse::<PrivateKeySigner>().is_err() {
        errors.push(ValidationError::InvalidKey(field));
    }
}
