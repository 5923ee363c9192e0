//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional) + process environment
//!     → loader.rs (parse values, apply defaults)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → passed by reference to every component
//! ```
//!
//! # Design Decisions
//! - Config is built once at startup and never mutated
//! - Optional values have defaults; only keys, RPC URL and fees are required
//! - Validation separates parsing from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_lookup, ConfigError};
pub use schema::{AppConfig, ChainConfig, FeeConfig, KeyConfig, PrivateKey, RelayConfig, ReportConfig};
