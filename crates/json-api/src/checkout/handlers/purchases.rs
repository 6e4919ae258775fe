//! Purchase History Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::{
    checkout::{models::Purchase, records::PurchaseItemRecord},
    discounts::records::DiscountCodeUuid,
};

use crate::{checkout::errors::into_status_error, extensions::*, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PurchaseItemResponse {
    pub game_uuid: Uuid,
    pub quantity: u32,

    /// Unit price charged at checkout, in minor units
    pub price_at_purchase: u64,
}

impl From<PurchaseItemRecord> for PurchaseItemResponse {
    fn from(item: PurchaseItemRecord) -> Self {
        PurchaseItemResponse {
            game_uuid: item.game.into_uuid(),
            quantity: item.quantity,
            price_at_purchase: item.price_at_purchase,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PurchaseResponse {
    pub uuid: Uuid,
    pub total: u64,
    pub discount_amount: u64,
    pub final_amount: u64,

    /// Redeemed discount code; absent once the code is deleted
    pub discount_code_uuid: Option<Uuid>,
    pub items: Vec<PurchaseItemResponse>,
    pub created_at: String,
}

impl From<Purchase> for PurchaseResponse {
    fn from(purchase: Purchase) -> Self {
        PurchaseResponse {
            uuid: purchase.uuid.into_uuid(),
            total: purchase.total,
            discount_amount: purchase.discount_amount,
            final_amount: purchase.final_amount,
            discount_code_uuid: purchase.discount_code.map(DiscountCodeUuid::into_uuid),
            items: purchase.items.into_iter().map(Into::into).collect(),
            created_at: purchase.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PurchasesResponse {
    /// Purchases, newest first
    pub purchases: Vec<PurchaseResponse>,
}

/// Purchase History Handler
#[endpoint(
    tags("checkout"),
    summary = "List Purchases",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<PurchasesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;

    let purchases = state
        .app
        .checkout
        .list_purchases(user)
        .await
        .map_err(into_status_error)?;

    Ok(Json(PurchasesResponse {
        purchases: purchases.into_iter().map(Into::into).collect(),
    }))
}
