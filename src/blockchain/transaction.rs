//! Transfer building and signing.
//!
//! # Responsibilities
//! - Derive EIP-1559 fee parameters from the latest base fee
//! - Describe a planned native-currency transfer
//! - Sign planned transfers into raw EIP-2718 envelopes

use alloy::eips::eip2718::Encodable2718;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::blockchain::wallet::{SignerRole, WalletSet};

/// EIP-1559 fee caps for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeParams {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

impl FeeParams {
    /// `max_fee = base_fee + priority_fee`.
    pub fn from_base_fee(base_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> Self {
        Self {
            max_fee_per_gas: base_fee_per_gas.saturating_add(max_priority_fee_per_gas),
            max_priority_fee_per_gas,
        }
    }

    /// Worst-case gas cost of one transaction with the given limit.
    pub fn max_cost(&self, gas_limit: u64) -> U256 {
        U256::from(gas_limit) * U256::from(self.max_fee_per_gas)
    }
}

/// A native-currency transfer that has been planned but not yet signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTransfer {
    pub signer: SignerRole,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub nonce: u64,
    pub gas_limit: u64,
    pub fees: FeeParams,
}

impl PlannedTransfer {
    /// Unsigned EIP-1559 request for this transfer.
    pub fn to_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_to(self.to)
            .with_value(self.value)
            .with_nonce(self.nonce)
            .with_gas_limit(self.gas_limit)
            .with_max_fee_per_gas(self.fees.max_fee_per_gas)
            .with_max_priority_fee_per_gas(self.fees.max_priority_fee_per_gas)
    }
}

/// A transfer signed by its owning wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransfer {
    pub transfer: PlannedTransfer,
    /// EIP-2718 encoded transaction.
    pub raw: Bytes,
    pub tx_hash: TxHash,
}

/// Sign one transfer with the wallet its role refers to.
pub async fn sign_transfer(
    wallets: &WalletSet,
    transfer: &PlannedTransfer,
) -> BlockchainResult<SignedTransfer> {
    let wallet = wallets.get(transfer.signer).ok_or_else(|| {
        BlockchainError::Wallet(format!("No wallet for signer {:?}", transfer.signer))
    })?;
    if wallet.address() != transfer.from {
        return Err(BlockchainError::Wallet(format!(
            "Signer {} does not own sender {}",
            wallet.address(),
            transfer.from
        )));
    }

    let envelope = wallet.sign_request(transfer.to_request()).await?;
    let tx_hash = *envelope.tx_hash();

    tracing::debug!(
        from = %transfer.from,
        to = %transfer.to,
        nonce = transfer.nonce,
        tx_hash = %tx_hash,
        "Transfer signed"
    );

    Ok(SignedTransfer {
        transfer: transfer.clone(),
        raw: Bytes::from(envelope.encoded_2718()),
        tx_hash,
    })
}

/// Sign transfers in order, preserving planning order in the output.
pub async fn sign_all(
    wallets: &WalletSet,
    transfers: &[PlannedTransfer],
) -> BlockchainResult<Vec<SignedTransfer>> {
    let mut signed = Vec::with_capacity(transfers.len());
    for transfer in transfers {
        signed.push(sign_transfer(wallets, transfer).await?);
    }
    Ok(signed)
}
