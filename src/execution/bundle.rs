//! Bundle execution through the private relay.
//!
//! A run moves through `building → signing → simulating → submitting`.
//! Any simulation failure aborts before submission; nothing is retried.

use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::transaction::sign_all;
use crate::blockchain::{ChainClient, WalletSet};
use crate::config::RelayConfig;
use crate::execution::{
    describe_transfer, AbortReason, ExecutionMode, ExecutionResult, RunOutcome,
    SimulationFailure, TransferExecutor,
};
use crate::relay::{
    decode_revert, BundleRelay, RevertReason, SignedBundle, SimulationResponse, SubmissionOutcome,
};
use crate::transfer::TransferPlan;

/// Submission targets and explorer links.
#[derive(Debug, Clone)]
pub struct BundleSettings {
    pub builders: Vec<String>,
    pub explorer_url: String,
    pub bundle_explorer_url: String,
}

impl From<&RelayConfig> for BundleSettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            builders: config.builders.clone(),
            explorer_url: config.explorer_url.trim_end_matches('/').to_string(),
            bundle_explorer_url: config.bundle_explorer_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Check a simulation response for failures.
///
/// Returns the simulated bundle hash when the bundle is clean.
pub fn inspect_simulation(response: &SimulationResponse) -> Result<Option<String>, AbortReason> {
    if let Some(error) = &response.error {
        tracing::error!(error = %error.message, "Simulation contains errors. Aborting");
        return Err(AbortReason::SimulationError(error.message.clone()));
    }

    let Some(result) = &response.result else {
        return Ok(None);
    };

    let failures: Vec<SimulationFailure> = result
        .results
        .iter()
        .filter_map(|tx| {
            let error = tx.error.as_ref()?;
            let reason = match &tx.revert {
                Some(revert) => decode_revert(revert),
                None => RevertReason::Text(error.clone()),
            };
            tracing::error!(
                tx_hash = tx.tx_hash.as_deref().unwrap_or("unknown"),
                %reason,
                "Simulation error in transaction"
            );
            Some(SimulationFailure {
                tx_hash: tx.tx_hash.clone(),
                reason,
            })
        })
        .collect();

    if failures.is_empty() {
        Ok(result.bundle_hash.clone())
    } else {
        tracing::error!(failed = failures.len(), "Simulation contains errors. Aborting");
        Err(AbortReason::SimulationFailed(failures))
    }
}

/// Builds one bundle from the plan and hands it to the relay.
pub struct BundleExecutor {
    chain: Arc<dyn ChainClient>,
    wallets: Arc<WalletSet>,
    relay: Arc<dyn BundleRelay>,
    settings: BundleSettings,
}

impl BundleExecutor {
    pub fn new(
        chain: Arc<dyn ChainClient>,
        wallets: Arc<WalletSet>,
        relay: Arc<dyn BundleRelay>,
        settings: BundleSettings,
    ) -> Self {
        Self {
            chain,
            wallets,
            relay,
            settings,
        }
    }

    fn tx_link(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.settings.explorer_url, hash)
    }

    async fn next_block(&self) -> ExecutionResult<u64> {
        Ok(self.chain.get_block_number().await? + 1)
    }
}

#[async_trait]
impl TransferExecutor for BundleExecutor {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Bundle
    }

    async fn execute(&self, plan: &TransferPlan) -> ExecutionResult<RunOutcome> {
        if plan.is_empty() {
            tracing::error!("No transactions to process");
            println!("Error: No transactions to process. / 没有可处理的交易");
            return Ok(RunOutcome::Aborted(AbortReason::EmptyBundle));
        }
        for transfer in &plan.transfers {
            println!("{}", describe_transfer(transfer));
        }

        println!("Signing the bundle...");
        let bundle = SignedBundle::new(sign_all(&self.wallets, &plan.transfers).await?);

        println!("Simulating the bundle...");
        let simulation_block = self.next_block().await?;
        let simulation = self.relay.simulate(&bundle, simulation_block).await?;
        println!("{}", serde_json::to_string_pretty(&simulation).unwrap_or_default());

        let simulated_hash = match inspect_simulation(&simulation) {
            Ok(hash) => hash,
            Err(reason) => return Ok(RunOutcome::Aborted(reason)),
        };
        println!("Simulation result: Success");

        let target_block = self.next_block().await?;
        if target_block != simulation_block {
            tracing::debug!(simulation_block, target_block, "Target block moved since simulation");
        }

        match self
            .relay
            .submit(&bundle, target_block, &self.settings.builders)
            .await
        {
            SubmissionOutcome::Accepted {
                bundle_hash,
                tx_hashes,
            } => {
                let tx_links: Vec<String> = if tx_hashes.is_empty() {
                    bundle
                        .tx_hashes()
                        .iter()
                        .map(|hash| self.tx_link(&hash.to_string()))
                        .collect()
                } else {
                    tx_hashes.iter().map(|hash| self.tx_link(hash)).collect()
                };

                tracing::info!(
                    target_block,
                    bundle_hash = bundle_hash.as_deref().unwrap_or("unknown"),
                    "Bundle submitted"
                );
                println!(
                    "Bundle submitted for block {}/blocks/{}, {}/bundle/{}",
                    self.settings.bundle_explorer_url,
                    target_block,
                    self.settings.bundle_explorer_url,
                    simulated_hash.as_deref().unwrap_or("unknown")
                );
                println!("Transaction links for executed transactions:");
                for link in &tx_links {
                    println!("{}", link);
                }

                Ok(RunOutcome::BundleSubmitted {
                    target_block,
                    bundle_hash: bundle_hash.or(simulated_hash),
                    tx_links,
                })
            }
            SubmissionOutcome::Rejected(message) => {
                tracing::error!(target_block, %message, "Relay rejected the bundle");
                Ok(RunOutcome::Aborted(AbortReason::Rejected(message)))
            }
            SubmissionOutcome::Ambiguous(reason) => {
                tracing::warn!(
                    target_block,
                    %reason,
                    "Bundle submission outcome unknown; check the target block before re-running"
                );
                Ok(RunOutcome::Ambiguous {
                    target_block,
                    reason,
                })
            }
        }
    }
}
