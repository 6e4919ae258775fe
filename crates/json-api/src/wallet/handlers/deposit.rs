//! Deposit Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};

use storefront_app::domain::users::models::DepositReceipt;

use crate::{
    extensions::*,
    state::State,
    wallet::{errors::into_status_error, get::WalletTransactionResponse},
};

/// Deposit Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DepositRequest {
    /// Amount to credit in minor units
    pub amount: u64,
}

/// Deposit Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DepositResponse {
    pub transaction: WalletTransactionResponse,

    /// Balance after the deposit
    pub balance: u64,
}

impl From<DepositReceipt> for DepositResponse {
    fn from(receipt: DepositReceipt) -> Self {
        DepositResponse {
            transaction: receipt.transaction.into(),
            balance: receipt.balance,
        }
    }
}

/// Deposit Handler
#[endpoint(
    tags("wallet"),
    summary = "Deposit Funds",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Funds deposited"),
        (status_code = StatusCode::BAD_REQUEST, description = "Amount is zero or would overflow the balance"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "wallet.deposit",
    skip(json, depot, res),
    fields(user_uuid = tracing::field::Empty, amount = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<DepositRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<DepositResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;
    let amount = json.into_inner().amount;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("amount", amount);

    let receipt = state
        .app
        .users
        .deposit(user, amount)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, "/wallet", true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(receipt.into()))
}
