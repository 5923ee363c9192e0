//! Configuration loading from the environment.

use std::path::{Path, PathBuf};

use alloy::primitives::utils::{parse_units, ParseUnits};
use thiserror::Error;

use crate::config::schema::{
    AppConfig, ChainConfig, FeeConfig, KeyConfig, PrivateKey, RelayConfig, ReportConfig,
};
use crate::config::validation::{validate_config, ValidationError};

pub const RPC_URL: &str = "RPC_URL";
pub const RELAY_SIGNING_KEY: &str = "FLASHBOTS_RELAY_SIGNING_KEY";
pub const FUNDING_KEY: &str = "DISTRIBUTE_PRIVATE_KEY";
pub const COLLECTION_KEYS: &str = "COLLECT_PRIVATE_KEY";
pub const MAX_PRIORITY_FEE_PER_GAS: &str = "MAX_PRIORITY_FEE_PER_GAS";
pub const GAS_LIMIT: &str = "GAS_LIMIT";

pub const RELAY_URL: &str = "FLASHBOTS_RELAY_URL";
pub const BUNDLE_CHAIN_ID: &str = "BUNDLE_CHAIN_ID";
pub const EXPLORER_URL: &str = "EXPLORER_URL";
pub const BUNDLE_EXPLORER_URL: &str = "BUNDLE_EXPLORER_URL";
pub const RPC_TIMEOUT_SECS: &str = "RPC_TIMEOUT_SECS";
pub const CONFIRMATION_TIMEOUT_SECS: &str = "CONFIRMATION_TIMEOUT_SECS";
pub const CONFIRMATION_POLL_MS: &str = "CONFIRMATION_POLL_MS";
pub const BALANCE_CONCURRENCY: &str = "BALANCE_CONCURRENCY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load env file {}: {source}", .path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenv::Error,
    },

    #[error("environment variable {0} not set")]
    Missing(&'static str),

    #[error("environment variable {key} is malformed: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from the process environment.
///
/// An explicit `env_file` must exist. Without one, a `.env` in the working
/// directory is picked up when present.
pub fn load_config(env_file: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match env_file {
        Some(path) => {
            dotenv::from_path(path).map_err(|source| ConfigError::EnvFile {
                path: path.to_path_buf(),
                source,
            })?;
        }
        None => {
            if let Ok(path) = dotenv::dotenv() {
                tracing::debug!(path = %path.display(), "Loaded .env file");
            }
        }
    }

    load_from_lookup(|key| std::env::var(key).ok())
}

/// Build and validate configuration from an arbitrary key lookup.
pub fn load_from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &'static str| -> Option<String> {
        lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    };
    let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

    let collection_keys = require(COLLECTION_KEYS)?
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(PrivateKey::new)
        .collect();

    let keys = KeyConfig {
        relay_signing_key: PrivateKey::new(require(RELAY_SIGNING_KEY)?),
        funding_key: PrivateKey::new(require(FUNDING_KEY)?),
        collection_keys,
    };

    let fees = FeeConfig {
        max_priority_fee_per_gas: parse_gwei(
            MAX_PRIORITY_FEE_PER_GAS,
            &require(MAX_PRIORITY_FEE_PER_GAS)?,
        )?,
        gas_limit: parse_number(GAS_LIMIT, &require(GAS_LIMIT)?)?,
    };

    let chain_defaults = ChainConfig::default();
    let chain = ChainConfig {
        rpc_url: require(RPC_URL)?,
        rpc_timeout_secs: optional_number(&get, RPC_TIMEOUT_SECS)?
            .unwrap_or(chain_defaults.rpc_timeout_secs),
        confirmation_timeout_secs: optional_number(&get, CONFIRMATION_TIMEOUT_SECS)?
            .unwrap_or(chain_defaults.confirmation_timeout_secs),
        confirmation_poll_ms: optional_number(&get, CONFIRMATION_POLL_MS)?
            .unwrap_or(chain_defaults.confirmation_poll_ms),
    };

    let relay_defaults = RelayConfig::default();
    let relay = RelayConfig {
        url: get(RELAY_URL).unwrap_or(relay_defaults.url),
        bundle_chain_id: optional_number(&get, BUNDLE_CHAIN_ID)?
            .unwrap_or(relay_defaults.bundle_chain_id),
        builders: relay_defaults.builders,
        explorer_url: get(EXPLORER_URL).unwrap_or(relay_defaults.explorer_url),
        bundle_explorer_url: get(BUNDLE_EXPLORER_URL)
            .unwrap_or(relay_defaults.bundle_explorer_url),
    };

    let report = ReportConfig {
        balance_concurrency: optional_number(&get, BALANCE_CONCURRENCY)?
            .unwrap_or(ReportConfig::default().balance_concurrency),
    };

    let config = AppConfig {
        chain,
        keys,
        fees,
        relay,
        report,
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn optional_number<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&'static str) -> Option<String>,
{
    get(key).map(|v| parse_number(key, &v)).transpose()
}

/// Parse a decimal gwei amount into wei.
fn parse_gwei(key: &'static str, value: &str) -> Result<u128, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid { key, reason };
    match parse_units(value, "gwei").map_err(|e| invalid(e.to_string()))? {
        ParseUnits::U256(wei) => {
            u128::try_from(wei).map_err(|_| invalid("value out of range".to_string()))
        }
        ParseUnits::I256(_) => Err(invalid("value must not be negative".to_string())),
    }
}
