//! Startup wiring and the two operations.
//!
//! ```text
//! AppConfig → ChainClient → chain id → WalletSet
//!           → ExecutionMode::for_chain → DirectExecutor | BundleExecutor
//! ```

use alloy::primitives::utils::format_ether;
use alloy::primitives::U256;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::{
    BlockchainClient, BlockchainResult, ChainClient, ChainId, Wallet, WalletSet,
};
use crate::cli::Command;
use crate::config::AppConfig;
use crate::execution::{
    BundleExecutor, BundleSettings, DirectExecutor, ExecutionMode, ExecutionResult, RunOutcome,
    TransferExecutor,
};
use crate::relay::{BundleRelay, FlashbotsRelay};
use crate::transfer::{current_fees, plan_collect, plan_distribute, print_balances, WalletBalance};

/// A connected tool instance. The execution strategy is fixed at construction.
pub struct App {
    config: AppConfig,
    chain: Arc<dyn ChainClient>,
    wallets: Arc<WalletSet>,
    executor: Box<dyn TransferExecutor>,
}

impl App {
    /// Connect to the configured RPC endpoint and, on the bundle network,
    /// the configured relay.
    pub async fn connect(config: AppConfig) -> ExecutionResult<Self> {
        let chain: Arc<dyn ChainClient> = Arc::new(BlockchainClient::new(&config.chain)?);
        let chain_id = chain.chain_id().await?;

        let relay: Option<Arc<dyn BundleRelay>> =
            match ExecutionMode::for_chain(chain_id, config.relay.bundle_chain_id) {
                ExecutionMode::Bundle => {
                    let auth = Wallet::from_private_key(
                        config.keys.relay_signing_key.expose(),
                        chain_id.0,
                    )?;
                    let relay: Arc<dyn BundleRelay> = Arc::new(FlashbotsRelay::new(
                        &config.relay,
                        auth,
                        Duration::from_secs(config.chain.rpc_timeout_secs),
                    )?);
                    Some(relay)
                }
                ExecutionMode::Direct => None,
            };

        Self::assemble(config, chain, chain_id, relay)
    }

    /// Build against an existing chain client and relay.
    ///
    /// The relay is only used when the chain turns out to be the bundle network.
    pub async fn with_clients(
        config: AppConfig,
        chain: Arc<dyn ChainClient>,
        relay: Arc<dyn BundleRelay>,
    ) -> ExecutionResult<Self> {
        let chain_id = chain.chain_id().await?;
        Self::assemble(config, chain, chain_id, Some(relay))
    }

    fn assemble(
        config: AppConfig,
        chain: Arc<dyn ChainClient>,
        chain_id: ChainId,
        relay: Option<Arc<dyn BundleRelay>>,
    ) -> ExecutionResult<Self> {
        let wallets = Arc::new(WalletSet::from_keys(&config.keys, chain_id.0)?);
        let mode = ExecutionMode::for_chain(chain_id, config.relay.bundle_chain_id);

        let executor: Box<dyn TransferExecutor> = match (mode, relay) {
            (ExecutionMode::Bundle, Some(relay)) => Box::new(BundleExecutor::new(
                chain.clone(),
                wallets.clone(),
                relay,
                BundleSettings::from(&config.relay),
            )),
            _ => Box::new(DirectExecutor::new(chain.clone(), wallets.clone())),
        };

        tracing::info!(chain_id = %chain_id, mode = ?executor.mode(), "Execution strategy selected");

        Ok(Self {
            config,
            chain,
            wallets,
            executor,
        })
    }

    pub fn mode(&self) -> ExecutionMode {
        self.executor.mode()
    }

    /// Print every wallet's balance, funding wallet first.
    pub async fn report_balances(&self) -> BlockchainResult<Vec<WalletBalance>> {
        print_balances(
            self.chain.as_ref(),
            &self.wallets,
            self.config.report.balance_concurrency,
        )
        .await
    }

    /// Send `amount` wei from the funding wallet to every collection wallet.
    pub async fn distribute(&self, amount: U256) -> ExecutionResult<RunOutcome> {
        let fees = current_fees(self.chain.as_ref(), self.config.fees.max_priority_fee_per_gas).await?;
        let plan = plan_distribute(
            self.chain.as_ref(),
            &self.wallets,
            amount,
            self.config.fees.gas_limit,
            fees,
        )
        .await?;

        self.executor.execute(&plan).await
    }

    /// Sweep every collection wallet's spendable balance into the funding wallet.
    pub async fn collect(&self) -> ExecutionResult<RunOutcome> {
        let fees = current_fees(self.chain.as_ref(), self.config.fees.max_priority_fee_per_gas).await?;
        let plan = plan_collect(
            self.chain.as_ref(),
            &self.wallets,
            self.config.fees.gas_limit,
            fees,
        )
        .await?;

        for skipped in &plan.skipped {
            let kept = format_ether(skipped.balance);
            println!(
                "No funds to collect from {}, keeping {} ETH (BNB) / 没有资金可归集 {}, 保留 {} ETH（BNB）.",
                skipped.address, kept, skipped.address, kept
            );
        }

        self.executor.execute(&plan).await
    }

    pub async fn run(&self, command: Command) -> ExecutionResult<RunOutcome> {
        let outcome = match command {
            Command::Distribute(amount) => self.distribute(amount).await?,
            Command::Collect => self.collect().await?,
        };

        if !outcome.is_success() {
            tracing::warn!(?outcome, "Operation did not complete");
        }
        Ok(outcome)
    }
}
