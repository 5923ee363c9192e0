//! Wallet management and transaction signing.
//!
//! # Security
//! - Private keys come only from the validated configuration
//! - Keys are never logged or serialized

use alloy::consensus::TxEnvelope;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::KeyConfig;
use crate::config::PrivateKey;

/// Wallet for transaction signing with a local nonce counter.
#[derive(Debug)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Next nonce to hand out for this run.
    nonce: Arc<AtomicU64>,
    /// Chain ID for EIP-155 replay protection.
    chain_id: u64,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for transaction signing
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(
            address = %signer.address(),
            chain_id = chain_id,
            "Wallet initialized"
        );

        Ok(Self {
            signer,
            nonce: Arc::new(AtomicU64::new(0)),
            chain_id,
        })
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get and increment the nonce atomically.
    pub fn get_and_increment_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Set the nonce to a specific value (e.g., after querying from chain).
    pub fn set_nonce(&self, nonce: u64) {
        self.nonce.store(nonce, Ordering::SeqCst);
    }

    /// Sign a fully populated transaction request with this wallet's key.
    pub async fn sign_request(&self, request: TransactionRequest) -> BlockchainResult<TxEnvelope> {
        let wallet = EthereumWallet::from(self.signer.clone());
        request
            .with_from(self.address())
            .with_chain_id(self.chain_id)
            .build(&wallet)
            .await
            .map_err(|e| BlockchainError::Signing(format!("Transaction signing failed: {}", e)))
    }

    /// Sign arbitrary message bytes (with Ethereum prefix).
    pub async fn sign_message(&self, message: &[u8]) -> BlockchainResult<alloy::signers::Signature> {
        self.signer
            .sign_message(message)
            .await
            .map_err(|e| BlockchainError::Signing(format!("Message signing failed: {}", e)))
    }
}

impl Clone for Wallet {
    fn clone(&self) -> Self {
        Self {
            signer: self.signer.clone(),
            nonce: self.nonce.clone(),
            chain_id: self.chain_id,
        }
    }
}

/// Which configured wallet owns (and signs) a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignerRole {
    Funding,
    Collection(usize),
}

/// The funding wallet plus the ordered list of collection wallets.
#[derive(Debug, Clone)]
pub struct WalletSet {
    funding: Wallet,
    collection: Vec<Wallet>,
}

impl WalletSet {
    pub fn new(funding: Wallet, collection: Vec<Wallet>) -> Self {
        Self {
            funding,
            collection,
        }
    }

    /// Build every wallet from configured keys for the given chain.
    pub fn from_keys(keys: &KeyConfig, chain_id: u64) -> BlockchainResult<Self> {
        let load = |key: &PrivateKey| Wallet::from_private_key(key.expose(), chain_id);

        let funding = load(&keys.funding_key)?;
        let collection = keys
            .collection_keys
            .iter()
            .map(load)
            .collect::<BlockchainResult<Vec<_>>>()?;

        tracing::info!(
            funding = %funding.address(),
            collection_wallets = collection.len(),
            chain_id = chain_id,
            "Wallets loaded"
        );

        Ok(Self::new(funding, collection))
    }

    pub fn funding(&self) -> &Wallet {
        &self.funding
    }

    pub fn collection(&self) -> &[Wallet] {
        &self.collection
    }

    /// Resolve a role to its wallet.
    pub fn get(&self, role: SignerRole) -> Option<&Wallet> {
        match role {
            SignerRole::Funding => Some(&self.funding),
            SignerRole::Collection(i) => self.collection.get(i),
        }
    }

    /// All wallets with their roles, funding wallet first.
    pub fn iter(&self) -> impl Iterator<Item = (SignerRole, &Wallet)> {
        std::iter::once((SignerRole::Funding, &self.funding)).chain(
            self.collection
                .iter()
                .enumerate()
                .map(|(i, w)| (SignerRole::Collection(i), w)),
        )
    }
}
