//! Transfer planning for the two operations.
//!
//! - distribute: the funding wallet sends a fixed amount to every collection
//!   wallet, nonces consecutive from its current transaction count
//! - collect: every collection wallet sends `balance - gas_limit * max_fee`
//!   back to the funding wallet, or is skipped when nothing is left

use alloy::primitives::{Address, U256};

use crate::blockchain::{BlockchainResult, ChainClient, FeeParams, PlannedTransfer, SignerRole, WalletSet};

/// Transfers to execute plus the wallets left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferPlan {
    pub transfers: Vec<PlannedTransfer>,
    pub skipped: Vec<SkippedWallet>,
}

impl TransferPlan {
    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

/// A collection wallet whose balance does not cover the reserved gas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWallet {
    pub address: Address,
    pub balance: U256,
}

/// Amount a wallet can sweep after reserving worst-case gas, if any.
pub fn collectible_amount(balance: U256, gas_limit: u64, fees: &FeeParams) -> Option<U256> {
    balance
        .checked_sub(fees.max_cost(gas_limit))
        .filter(|sendable| !sendable.is_zero())
}

/// Plan `amount` from the funding wallet to each collection wallet, in list order.
pub async fn plan_distribute(
    chain: &dyn ChainClient,
    wallets: &WalletSet,
    amount: U256,
    gas_limit: u64,
    fees: FeeParams,
) -> BlockchainResult<TransferPlan> {
    let funding = wallets.funding();
    let start_nonce = chain.get_transaction_count(funding.address()).await?;
    funding.set_nonce(start_nonce);

    let transfers = wallets
        .collection()
        .iter()
        .map(|target| PlannedTransfer {
            signer: SignerRole::Funding,
            from: funding.address(),
            to: target.address(),
            value: amount,
            nonce: funding.get_and_increment_nonce(),
            gas_limit,
            fees,
        })
        .collect::<Vec<_>>();

    tracing::info!(
        from = %funding.address(),
        start_nonce,
        transfers = transfers.len(),
        %amount,
        "Distribution planned"
    );

    Ok(TransferPlan {
        transfers,
        skipped: Vec::new(),
    })
}

/// Plan a sweep of every collection wallet into the funding wallet.
pub async fn plan_collect(
    chain: &dyn ChainClient,
    wallets: &WalletSet,
    gas_limit: u64,
    fees: FeeParams,
) -> BlockchainResult<TransferPlan> {
    let destination = wallets.funding().address();
    let mut plan = TransferPlan::default();

    for (index, wallet) in wallets.collection().iter().enumerate() {
        let address = wallet.address();
        let nonce = chain.get_transaction_count(address).await?;
        let balance = chain.get_balance(address).await?;

        let Some(value) = collectible_amount(balance, gas_limit, &fees) else {
            tracing::info!(%address, %balance, "Nothing to collect, wallet skipped");
            plan.skipped.push(SkippedWallet { address, balance });
            continue;
        };

        plan.transfers.push(PlannedTransfer {
            signer: SignerRole::Collection(index),
            from: address,
            to: destination,
            value,
            nonce,
            gas_limit,
            fees,
        });
    }

    tracing::info!(
        to = %destination,
        transfers = plan.transfers.len(),
        skipped = plan.skipped.len(),
        "Collection planned"
    );

    Ok(plan)
}
