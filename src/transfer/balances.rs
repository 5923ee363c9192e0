//! Balance report for the funding and collection wallets.

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use futures_util::stream::{self, StreamExt, TryStreamExt};

use crate::blockchain::{BlockchainError, BlockchainResult, ChainClient, SignerRole, WalletSet};

/// One line of the balance report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletBalance {
    pub role: SignerRole,
    pub address: Address,
    pub balance: U256,
}

impl std::fmt::Display for WalletBalance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.role {
            SignerRole::Funding => "Funding wallet / 分发主钱包",
            SignerRole::Collection(_) => "Collection wallet / 批量钱包",
        };
        write!(
            f,
            "{} ({}) balance / 余额: {} ETH (BNB)",
            label,
            self.address,
            format_ether(self.balance)
        )
    }
}

/// Fetch every wallet's balance, funding wallet first.
///
/// Up to `concurrency` reads are in flight; output order follows wallet order.
pub async fn fetch_balances(
    chain: &dyn ChainClient,
    wallets: &WalletSet,
    concurrency: usize,
) -> BlockchainResult<Vec<WalletBalance>> {
    stream::iter(wallets.iter())
        .map(|(role, wallet)| async move {
            let address = wallet.address();
            let balance = chain.get_balance(address).await?;
            Ok::<_, BlockchainError>(WalletBalance {
                role,
                address,
                balance,
            })
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

/// Fetch and print the balance report.
pub async fn print_balances(
    chain: &dyn ChainClient,
    wallets: &WalletSet,
    concurrency: usize,
) -> BlockchainResult<Vec<WalletBalance>> {
    let balances = fetch_balances(chain, wallets, concurrency).await?;
    for line in &balances {
        println!("{}", line);
    }
    Ok(balances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn test_report_line() {
        let line = WalletBalance {
            role: SignerRole::Funding,
            address: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            balance: U256::from(1_500_000_000_000_000_000u64),
        };
        assert_eq!(
            line.to_string(),
            "Funding wallet / 分发主钱包 (0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266) balance / 余额: 1.500000000000000000 ETH (BNB)"
        );
    }
}
