//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint
//! - Query chain state (chain id, block, balances, nonces)
//! - Broadcast signed transfers and wait until they are mined

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{Provider, ProviderBuilder};
use async_trait::async_trait;
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::transaction::SignedTransfer;
use crate::blockchain::types::{
    BlockchainError, BlockchainResult, ChainId, ConfirmationStatus, LatestBlock, TransferReceipt,
};
use crate::config::ChainConfig;

/// Chain operations used by planning and execution.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Network identifier of the connected chain.
    async fn chain_id(&self) -> BlockchainResult<ChainId>;

    /// Current balance of an address.
    async fn get_balance(&self, address: Address) -> BlockchainResult<U256>;

    /// Number and base fee of the latest block.
    async fn get_latest_block(&self) -> BlockchainResult<LatestBlock>;

    /// Latest block number.
    async fn get_block_number(&self) -> BlockchainResult<u64>;

    /// Transaction count (next nonce) of an address.
    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64>;

    /// Broadcast a signed transfer and wait until it is mined.
    async fn send_transaction(&self, tx: &SignedTransfer) -> BlockchainResult<TransferReceipt>;
}

/// Blockchain RPC client wrapper.
#[derive(Clone)]
pub struct BlockchainClient {
    provider: Arc<dyn Provider + Send + Sync>,
    config: ChainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client. No request is made until first use.
    pub fn new(config: &ChainConfig) -> BlockchainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        let provider =
            Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>;

        tracing::info!(rpc_url = %config.rpc_url, "Blockchain client initialized");

        Ok(Self {
            provider,
            config: config.clone(),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
        })
    }

    /// Run one RPC call under the request timeout.
    async fn call<T, E, F>(&self, what: &'static str, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::warn!(call = what, error = %e, "RPC error");
                Err(BlockchainError::Rpc(format!("{} failed: {}", what, e)))
            }
            Err(_) => {
                tracing::warn!(call = what, "RPC timeout");
                Err(BlockchainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Poll once for the receipt of a broadcast transaction.
    async fn poll_receipt(&self, tx_hash: TxHash) -> BlockchainResult<ConfirmationStatus> {
        let receipt = self
            .call(
                "eth_getTransactionReceipt",
                self.provider.get_transaction_receipt(tx_hash),
            )
            .await?;

        Ok(match receipt {
            None => ConfirmationStatus::Pending,
            Some(r) if !r.status() => ConfirmationStatus::Reverted(tx_hash),
            Some(r) => ConfirmationStatus::Mined(TransferReceipt {
                tx_hash,
                block_number: r.block_number,
                gas_used: r.gas_used,
            }),
        })
    }

    /// Wait for a transaction to be mined.
    pub async fn wait_for_confirmation(&self, tx_hash: TxHash) -> BlockchainResult<TransferReceipt> {
        let secs = self.config.confirmation_timeout_secs;
        let poll_interval = Duration::from_millis(self.config.confirmation_poll_ms);

        let result = timeout(Duration::from_secs(secs), async {
            let mut ticker = interval(poll_interval);

            loop {
                ticker.tick().await;

                match self.poll_receipt(tx_hash).await? {
                    ConfirmationStatus::Pending => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    }
                    ConfirmationStatus::Reverted(hash) => {
                        return Err(BlockchainError::Reverted(hash));
                    }
                    ConfirmationStatus::Mined(receipt) => return Ok(receipt),
                }
            }
        })
        .await;

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(BlockchainError::ConfirmationTimeout { tx_hash, secs }),
        }
    }
}

#[async_trait]
impl ChainClient for BlockchainClient {
    async fn chain_id(&self) -> BlockchainResult<ChainId> {
        let id = self.call("eth_chainId", self.provider.get_chain_id()).await?;
        Ok(ChainId(id))
    }

    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        self.call("eth_getBalance", self.provider.get_balance(address))
            .await
    }

    async fn get_latest_block(&self) -> BlockchainResult<LatestBlock> {
        let block = self
            .call(
                "eth_getBlockByNumber",
                self.provider.get_block_by_number(BlockNumberOrTag::Latest),
            )
            .await?
            .ok_or_else(|| BlockchainError::Rpc("Latest block not available".to_string()))?;

        Ok(LatestBlock {
            number: block.header.number,
            base_fee_per_gas: block.header.base_fee_per_gas.map(u128::from).unwrap_or(0),
        })
    }

    async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.call("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64> {
        self.call(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address),
        )
        .await
    }

    async fn send_transaction(&self, tx: &SignedTransfer) -> BlockchainResult<TransferReceipt> {
        let pending = self
            .call(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(&tx.raw),
            )
            .await?;
        let tx_hash = *pending.tx_hash();
        if tx_hash != tx.tx_hash {
            tracing::warn!(expected = %tx.tx_hash, returned = %tx_hash, "Node returned a different tx hash");
        }

        tracing::info!(
            tx_hash = %tx_hash,
            from = %tx.transfer.from,
            nonce = tx.transfer.nonce,
            "Transaction broadcast, waiting to be mined"
        );

        self.wait_for_confirmation(tx_hash).await
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(rpc_url: &str) -> ChainConfig {
        ChainConfig {
            rpc_url: rpc_url.to_string(),
            rpc_timeout_secs: 1,
            confirmation_timeout_secs: 1,
            confirmation_poll_ms: 100,
        }
    }

    #[test]
    fn test_client_creation_is_lazy() {
        // Nothing listens here; construction must still succeed.
        let client = BlockchainClient::new(&test_config("http://127.0.0.1:1"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let err = BlockchainClient::new(&test_config("not a url")).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let client = BlockchainClient::new(&test_config("http://127.0.0.1:1")).unwrap();
        let result = client.get_block_number().await;
        assert!(result.is_err());
    }
}
