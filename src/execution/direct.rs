//! Direct execution: one ordinary transaction per transfer.

use async_trait::async_trait;
use std::sync::Arc;

use crate::blockchain::transaction::sign_transfer;
use crate::blockchain::{ChainClient, WalletSet};
use crate::execution::{
    describe_transfer, ExecutionMode, ExecutionResult, RunOutcome, TransferExecutor,
};
use crate::transfer::TransferPlan;

/// Sends each transfer and waits for it to be mined before the next.
pub struct DirectExecutor {
    chain: Arc<dyn ChainClient>,
    wallets: Arc<WalletSet>,
}

impl DirectExecutor {
    pub fn new(chain: Arc<dyn ChainClient>, wallets: Arc<WalletSet>) -> Self {
        Self { chain, wallets }
    }
}

#[async_trait]
impl TransferExecutor for DirectExecutor {
    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Direct
    }

    async fn execute(&self, plan: &TransferPlan) -> ExecutionResult<RunOutcome> {
        if plan.is_empty() {
            tracing::info!("No transfers to send");
        }

        let mut receipts = Vec::with_capacity(plan.transfers.len());
        for transfer in &plan.transfers {
            let signed = sign_transfer(&self.wallets, transfer).await?;
            let receipt = self.chain.send_transaction(&signed).await?;

            tracing::info!(
                tx_hash = %receipt.tx_hash,
                block = ?receipt.block_number,
                gas_used = receipt.gas_used,
                "Transfer mined"
            );
            println!("{}", describe_transfer(transfer));
            receipts.push(receipt);
        }

        Ok(RunOutcome::Sent(receipts))
    }
}
