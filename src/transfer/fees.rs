//! Fee derivation from the latest block.

use crate::blockchain::{BlockchainResult, ChainClient, FeeParams};

/// Read the latest base fee and add the configured priority fee.
pub async fn current_fees(
    chain: &dyn ChainClient,
    max_priority_fee_per_gas: u128,
) -> BlockchainResult<FeeParams> {
    let block = chain.get_latest_block().await?;
    let fees = FeeParams::from_base_fee(block.base_fee_per_gas, max_priority_fee_per_gas);

    tracing::info!(
        block = block.number,
        base_fee_per_gas = block.base_fee_per_gas,
        max_fee_per_gas = fees.max_fee_per_gas,
        max_priority_fee_per_gas = fees.max_priority_fee_per_gas,
        "Fee parameters derived"
    );

    Ok(fees)
}
