//! User Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use thiserror::Error;

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<UserRecord>;

/// User Record
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub uuid: UserUuid,
    pub email: String,
    pub is_admin: bool,
    pub wallet_balance: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Wallet Transaction UUID
pub type WalletTransactionUuid = TypedUuid<WalletTransactionRecord>;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WalletTransactionKind {
    Deposit,
    Purchase,
}

impl WalletTransactionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Purchase => "purchase",
        }
    }
}

impl fmt::Display for WalletTransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown wallet transaction kind: {0}")]
pub struct UnknownTransactionKind(String);

impl FromStr for WalletTransactionKind {
    type Err = UnknownTransactionKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "purchase" => Ok(Self::Purchase),
            other => Err(UnknownTransactionKind(other.to_string())),
        }
    }
}

/// Wallet Transaction Record (append-only ledger entry)
#[derive(Debug, Clone)]
pub struct WalletTransactionRecord {
    pub uuid: WalletTransactionUuid,
    pub user: UserUuid,
    pub kind: WalletTransactionKind,
    pub amount: u64,
    pub description: String,
    pub created_at: Timestamp,
}
