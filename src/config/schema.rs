//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tool.
//! Non-secret sections carry defaults so that only the required environment
//! values have to be provided.

/// Network identifier that requires private bundle submission (Ethereum mainnet).
pub const DEFAULT_BUNDLE_CHAIN_ID: u64 = 1;

/// Default Flashbots relay endpoint.
pub const DEFAULT_RELAY_URL: &str = "https://relay.flashbots.net";

/// Block builders the bundle is shared with on submission.
pub const DEFAULT_BUILDERS: [&str; 18] = [
    "flashbots",
    "f1b.io",
    "rsync",
    "beaverbuild.org",
    "builder0x69",
    "Titan",
    "EigenPhi",
    "boba-builder",
    "Gambit Labs",
    "payload",
    "Loki",
    "BuildAI",
    "JetBuilder",
    "tbuilder",
    "penguinbuild",
    "bobthebuilder",
    "BTCS",
    "bloXroute",
];

/// Root configuration, built once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Chain endpoint and RPC behaviour.
    pub chain: ChainConfig,

    /// Signing keys for the funding, collection and relay-auth wallets.
    pub keys: KeyConfig,

    /// Fee and gas parameters applied to every transfer.
    pub fees: FeeConfig,

    /// Private relay settings (bundle network only).
    pub relay: RelayConfig,

    /// Balance report settings.
    pub report: ReportConfig,
}

/// Chain endpoint configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Maximum time to wait for a sent transaction to be mined, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Receipt polling interval in milliseconds.
    pub confirmation_poll_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            rpc_timeout_secs: 30,
            confirmation_timeout_secs: 300,
            confirmation_poll_ms: 2000,
        }
    }
}

/// A hex-encoded private key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(hex: impl Into<String>) -> Self {
        Self(hex.into().trim().to_string())
    }

    /// The raw hex string, with or without `0x` prefix as configured.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Key material normalised for comparisons (lowercase, no prefix).
    pub fn normalized(&self) -> String {
        self.0
            .strip_prefix("0x")
            .unwrap_or(&self.0)
            .to_ascii_lowercase()
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Wallet keys.
#[derive(Debug, Clone)]
pub struct KeyConfig {
    /// Key used only to authenticate requests to the relay.
    pub relay_signing_key: PrivateKey,

    /// Funding wallet key.
    pub funding_key: PrivateKey,

    /// Collection wallet keys, in list order.
    pub collection_keys: Vec<PrivateKey>,
}

/// Fee configuration.
#[derive(Debug, Clone)]
pub struct FeeConfig {
    /// Priority fee in wei (configured in gwei).
    pub max_priority_fee_per_gas: u128,

    /// Gas limit for every transfer.
    pub gas_limit: u64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            max_priority_fee_per_gas: 1_000_000_000,
            gas_limit: 21_000,
        }
    }
}

/// Private relay configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Relay JSON-RPC endpoint.
    pub url: String,

    /// Chain ID on which transfers are bundled instead of sent directly.
    pub bundle_chain_id: u64,

    /// Builder names included in `eth_sendBundle`.
    pub builders: Vec<String>,

    /// Block explorer base URL used for transaction links.
    pub explorer_url: String,

    /// Bundle explorer base URL used for block and bundle links.
    pub bundle_explorer_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RELAY_URL.to_string(),
            bundle_chain_id: DEFAULT_BUNDLE_CHAIN_ID,
            builders: DEFAULT_BUILDERS.iter().map(|b| b.to_string()).collect(),
            explorer_url: "https://etherscan.io".to_string(),
            bundle_explorer_url: "https://blocks.flashbots.net/v1".to_string(),
        }
    }
}

/// Balance report configuration.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Maximum number of balance reads in flight at once.
    pub balance_concurrency: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            balance_concurrency: 4,
        }
    }
}
