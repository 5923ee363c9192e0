//! Transfer planning subsystem.
//!
//! # Data Flow
//! ```text
//! latest block → fees.rs (max fee = base fee + priority fee)
//! wallets + chain state → planner.rs (distribute / collect plans)
//! wallets + chain state → balances.rs (ordered balance report)
//! ```

pub mod balances;
pub mod fees;
pub mod planner;

pub use balances::{fetch_balances, print_balances, WalletBalance};
pub use fees::current_fees;
pub use planner::{collectible_amount, plan_collect, plan_distribute, SkippedWallet, TransferPlan};
