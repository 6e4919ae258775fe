//! Apply Discount Handler

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::discounts::models::DiscountPreview;

use crate::{discounts::errors::into_status_error, extensions::*, state::State};

/// Apply Discount Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyDiscountRequest {
    pub code: String,

    /// Order total in minor units
    pub total_amount: u64,

    /// Must be the signed-in user
    pub user_id: Uuid,
}

/// Apply Discount Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ApplyDiscountResponse {
    pub discount_code_uuid: Uuid,
    pub code: String,
    pub total: u64,
    pub discount_amount: u64,
    pub final_amount: u64,
}

impl From<DiscountPreview> for ApplyDiscountResponse {
    fn from(preview: DiscountPreview) -> Self {
        ApplyDiscountResponse {
            discount_code_uuid: preview.discount_code.into_uuid(),
            code: preview.code,
            total: preview.applied.total,
            discount_amount: preview.applied.discount_amount,
            final_amount: preview.applied.final_amount,
        }
    }
}

/// Apply Discount Handler
///
/// Reports whether a code would apply to an order and what it would take off.
/// Nothing is redeemed.
#[endpoint(
    tags("discounts"),
    summary = "Preview Discount Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Code applies"),
        (status_code = StatusCode::BAD_REQUEST, description = "Code cannot be redeemed"),
        (status_code = StatusCode::FORBIDDEN, description = "user_id does not match the session"),
        (status_code = StatusCode::NOT_FOUND, description = "Code not found"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<ApplyDiscountRequest>,
    depot: &mut Depot,
) -> Result<Json<ApplyDiscountResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_or_401()?;
    let request = json.into_inner();

    if request.user_id != user.into_uuid() {
        return Err(StatusError::forbidden().brief("user_id does not match the session"));
    }

    let preview = state
        .app
        .discounts
        .apply_discount(user, request.code, request.total_amount, Timestamp::now())
        .await
        .map_err(into_status_error)?;

    Ok(Json(preview.into()))
}
