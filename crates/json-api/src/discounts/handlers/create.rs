//! Create Discount Code Handler

use std::sync::Arc;

use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::discounts::data::NewDiscountCode;

use crate::{
    discounts::{errors::into_status_error, requests::CreateDiscountCodeRequest},
    extensions::*,
    state::State,
};

/// Discount Code Created Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct DiscountCodeCreatedResponse {
    /// Created discount code UUID
    pub uuid: Uuid,
}

/// Create Discount Code Handler
#[endpoint(
    tags("admin"),
    summary = "Create Discount Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Discount code created"),
        (status_code = StatusCode::CONFLICT, description = "Discount code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::FORBIDDEN, description = "Admin access required"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "discounts.create",
    skip(json, depot, res),
    fields(code = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    json: JsonBody<CreateDiscountCodeRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<DiscountCodeCreatedResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let new = NewDiscountCode::try_from(json.into_inner())?;

    tracing::Span::current().record("code", new.code.as_str());

    let uuid = state
        .app
        .discounts
        .create_discount_code(new)
        .await
        .map_err(into_status_error)?
        .uuid;

    res.add_header(LOCATION, format!("/admin/discounts/{uuid}"), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(DiscountCodeCreatedResponse {
        uuid: uuid.into_uuid(),
    }))
}
