//! Discount Code Index Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    discounts::{errors::into_status_error, get::DiscountCodeResponse},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DiscountCodesResponse {
    /// Discount codes, newest first
    pub discount_codes: Vec<DiscountCodeResponse>,
}

/// Discount Code Index Handler
///
/// Lists every discount code and wakes the deactivation sweeper so exhausted or
/// expired codes are switched off soon after an admin looks at them.
#[endpoint(
    tags("admin"),
    summary = "List Discount Codes",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<DiscountCodesResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state.sweep_trigger.notify_one();

    let codes = state
        .app
        .discounts
        .list_discount_codes()
        .await
        .map_err(into_status_error)?;

    Ok(Json(DiscountCodesResponse {
        discount_codes: codes.into_iter().map(Into::into).collect(),
    }))
}
