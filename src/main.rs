//! wallet-disperse
//!
//! Moves native currency between one funding wallet and a list of
//! collection wallets.
//!
//! # Architecture Overview
//!
//! ```text
//!   .env / environment ──▶ config ──▶ App::connect
//!                                        │
//!                      ┌─────────────────┴──────────────────┐
//!                      ▼                                    ▼
//!               blockchain (RPC)                     relay (bundle network only)
//!                      │                                    │
//!                      ▼                                    │
//!   operator ──▶ cli prompts ──▶ transfer planner ──▶ execution
//!                                                  direct | bundle
//! ```
//!
//! Balances are printed before and after the selected operation.

use clap::Parser;
use tokio::io::BufReader;

use wallet_disperse::cli::{choose_command, Args, InputError};
use wallet_disperse::config::load_config;
use wallet_disperse::observability::init_logging;
use wallet_disperse::App;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging();

    tracing::info!("wallet-disperse v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.env_file.as_deref())?;
    tracing::info!(
        rpc_url = %config.chain.rpc_url,
        collection_wallets = config.keys.collection_keys.len(),
        gas_limit = config.fees.gas_limit,
        "Configuration loaded"
    );

    let app = App::connect(config).await?;
    app.report_balances().await?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    match choose_command(&mut stdin, args.action.as_deref(), args.amount.as_deref()).await? {
        Ok(command) => {
            app.run(command).await?;
        }
        Err(InputError::Action(_)) => {}
        // A bad amount ends the run on the spot.
        Err(InputError::Amount(_)) => return Ok(()),
    }

    app.report_balances().await?;
    Ok(())
}
