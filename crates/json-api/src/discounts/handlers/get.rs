//! Get Discount Code Handler

use std::{string::ToString, sync::Arc};

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::discounts::records::DiscountCodeRecord;

use crate::{
    discounts::{errors::into_status_error, requests::DiscountType},
    extensions::*,
    state::State,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DiscountCodeResponse {
    pub uuid: Uuid,
    pub code: String,
    pub discount_type: DiscountType,

    /// Percentage for `percent` codes, minor units for `fixed` codes
    pub discount_value: String,

    /// Minimum order total in minor units
    pub min_total: u64,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub usage_limit: Option<u64>,
    pub single_use_per_user: bool,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<DiscountCodeRecord> for DiscountCodeResponse {
    fn from(record: DiscountCodeRecord) -> Self {
        let (discount_type, discount_value) = DiscountType::split(&record.rules.kind);

        DiscountCodeResponse {
            uuid: record.uuid.into_uuid(),
            code: record.code,
            discount_type,
            discount_value,
            min_total: record.rules.min_total,
            starts_at: record.rules.starts_at.as_ref().map(ToString::to_string),
            ends_at: record.rules.ends_at.as_ref().map(ToString::to_string),
            usage_limit: record.rules.usage_limit,
            single_use_per_user: record.rules.single_use_per_user,
            active: record.active,
            created_at: record.created_at.to_string(),
            updated_at: record.updated_at.to_string(),
        }
    }
}

/// Get Discount Code Handler
#[endpoint(
    tags("admin"),
    summary = "Get Discount Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Discount code"),
        (status_code = StatusCode::NOT_FOUND, description = "Discount code not found"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
    ),
)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<DiscountCodeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let code = state
        .app
        .discounts
        .get_discount_code(uuid.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(code.into()))
}
