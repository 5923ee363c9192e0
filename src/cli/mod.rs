//! Command-line surface.
//!
//! # Data Flow
//! ```text
//! argv → Args (clap)
//! stdin / presets → prompt.rs (action + amount) → Command
//! ```

pub mod prompt;

use clap::Parser;
use std::path::PathBuf;

pub use prompt::{choose_command, parse_amount, Action, AmountError, Command, InputError};

#[derive(Debug, Parser)]
#[command(name = "wallet-disperse")]
#[command(
    about = "Distribute native currency to collection wallets or collect it back",
    long_about = None
)]
pub struct Args {
    /// Env file to load instead of ./.env
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Pre-answer the action prompt (1, 2, distribute, collect)
    #[arg(short, long)]
    pub action: Option<String>,

    /// Pre-answer the amount prompt, in ETH (BNB) per wallet
    #[arg(long)]
    pub amount: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_is_interactive() {
        let args = Args::try_parse_from(["wallet-disperse"]).unwrap();
        assert!(args.env_file.is_none());
        assert!(args.action.is_none());
        assert!(args.amount.is_none());
    }

    #[test]
    fn test_presets() {
        let args = Args::try_parse_from([
            "wallet-disperse",
            "--env-file",
            "prod.env",
            "-a",
            "distribute",
            "--amount",
            "0.1",
        ])
        .unwrap();
        assert_eq!(args.env_file, Some(PathBuf::from("prod.env")));
        assert_eq!(args.action.as_deref(), Some("distribute"));
        assert_eq!(args.amount.as_deref(), Some("0.1"));
    }
}
