//! Update Discount Code Handler

use std::sync::Arc;

use salvo::{
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use uuid::Uuid;

use storefront_app::domain::discounts::data::DiscountCodeUpdate;

use crate::{
    discounts::{
        errors::into_status_error, get::DiscountCodeResponse, requests::UpdateDiscountCodeRequest,
    },
    extensions::*,
    state::State,
};

/// Update Discount Code Handler
///
/// Partial update. Reactivating an inactive code resets its usage history.
#[endpoint(
    tags("admin"),
    summary = "Update Discount Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Discount code updated"),
        (status_code = StatusCode::NOT_FOUND, description = "Discount code not found"),
        (status_code = StatusCode::CONFLICT, description = "Discount code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "discounts.update",
    skip(uuid, json, depot),
    fields(
        discount_code_uuid = tracing::field::Empty,
        reactivating = tracing::field::Empty
    ),
    err
)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    json: JsonBody<UpdateDiscountCodeRequest>,
    depot: &mut Depot,
) -> Result<Json<DiscountCodeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let uuid = uuid.into_inner();
    let update = DiscountCodeUpdate::try_from(json.into_inner())?;

    let span = tracing::Span::current();

    span.record("discount_code_uuid", tracing::field::display(uuid));
    span.record("reactivating", update.active == Some(true));

    let code = state
        .app
        .discounts
        .update_discount_code(uuid.into(), update)
        .await
        .map_err(into_status_error)?;

    Ok(Json(code.into()))
}
