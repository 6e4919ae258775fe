//! Delete Discount Code Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{discounts::errors::into_status_error, extensions::*, state::State};

/// Delete Discount Code Handler
///
/// Past purchases keep their amounts but lose the reference to the code.
#[endpoint(
    tags("admin"),
    summary = "Delete Discount Code",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Discount code deleted"),
        (status_code = StatusCode::NOT_FOUND, description = "Discount code not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    uuid: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<StatusCode, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    state
        .app
        .discounts
        .delete_discount_code(uuid.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(StatusCode::OK)
}
