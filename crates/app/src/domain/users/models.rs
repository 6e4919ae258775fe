//! User Models

use crate::domain::users::records::{UserUuid, WalletTransactionRecord};

/// Wallet balance together with its ledger, newest entry first.
#[derive(Debug, Clone)]
pub struct Wallet {
    pub user: UserUuid,
    pub balance: u64,
    pub transactions: Vec<WalletTransactionRecord>,
}

/// Result of a deposit: the ledger entry and the balance after it.
#[derive(Debug, Clone)]
pub struct DepositReceipt {
    pub transaction: WalletTransactionRecord,
    pub balance: u64,
}
