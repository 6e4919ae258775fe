//! Get Wallet Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::users::{models::Wallet, records::WalletTransactionRecord};

use crate::{extensions::*, state::State, wallet::errors::into_status_error};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WalletTransactionResponse {
    pub uuid: Uuid,

    /// `deposit` or `purchase`
    pub kind: String,

    /// Amount in minor units
    pub amount: u64,
    pub description: String,
    pub created_at: String,
}

impl From<WalletTransactionRecord> for WalletTransactionResponse {
    fn from(transaction: WalletTransactionRecord) -> Self {
        WalletTransactionResponse {
            uuid: transaction.uuid.into_uuid(),
            kind: transaction.kind.to_string(),
            amount: transaction.amount,
            description: transaction.description,
            created_at: transaction.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct WalletResponse {
    /// Balance in minor units
    pub balance: u64,

    /// Ledger entries, newest first
    pub transactions: Vec<WalletTransactionResponse>,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        WalletResponse {
            balance: wallet.balance,
            transactions: wallet.transactions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Get Wallet Handler
#[endpoint(
    tags("wallet"),
    summary = "Get Wallet",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<WalletResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let wallet = state
        .app
        .users
        .get_wallet(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(wallet.into()))
}
