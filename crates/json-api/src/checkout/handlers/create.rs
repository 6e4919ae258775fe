//! Checkout Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::checkout::models::CheckoutReceipt;

use crate::{checkout::errors::into_status_error, extensions::*, state::State};

/// Checkout Request
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutRequest {
    /// Discount code to redeem with this purchase
    #[serde(default)]
    pub discount_code: Option<String>,
}

/// Checkout Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutResponse {
    /// Created purchase UUID
    pub purchase_id: Uuid,

    /// Cart total before the discount, in minor units
    pub total: u64,

    /// Amount taken off by the discount code
    pub discount: u64,

    /// Amount debited from the wallet
    pub final_amount: u64,

    /// Distinct games bought
    pub games_count: u64,

    /// Units bought across all lines
    pub items_count: u64,

    /// Redeemed discount code, if any
    pub discount_code: Option<String>,

    /// Wallet balance after the purchase
    pub balance: u64,

    pub created_at: String,
}

impl From<CheckoutReceipt> for CheckoutResponse {
    fn from(receipt: CheckoutReceipt) -> Self {
        CheckoutResponse {
            purchase_id: receipt.purchase.uuid.into_uuid(),
            total: receipt.purchase.total,
            discount: receipt.purchase.discount_amount,
            final_amount: receipt.purchase.final_amount,
            games_count: receipt.games_count,
            items_count: receipt.items_count,
            discount_code: receipt.discount_code,
            balance: receipt.balance,
            created_at: receipt.purchase.created_at.to_string(),
        }
    }
}

/// Checkout Handler
///
/// Buys everything in the caller's cart, optionally redeeming a discount code.
#[endpoint(
    tags("checkout"),
    summary = "Check Out Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Purchase completed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Checkout rejected"),
        (status_code = StatusCode::UNAUTHORIZED, description = "Missing or invalid session"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Storage failure or lock timeout; safe to resubmit"),
    ),
)]
#[tracing::instrument(
    name = "checkout.create",
    skip(json, depot),
    fields(
        user_uuid = tracing::field::Empty,
        has_discount_code = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
) -> Result<Json<CheckoutResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;
    let request = json.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("has_discount_code", request.discount_code.is_some());

    let receipt = state
        .app
        .checkout
        .checkout(user, request.discount_code, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(receipt.into()))
}
