//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (addresses, nonces, hashes)
//!     → logging.rs (EnvFilter + fmt layer, written to stderr)
//! ```
//!
//! Operator-facing output (prompts, balance reports, links) goes to stdout
//! with `println!`; diagnostics go through `tracing`.

pub mod logging;

pub use logging::init_logging;
