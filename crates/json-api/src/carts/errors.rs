//! Cart Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::carts::CartsServiceError;

pub(crate) fn into_status_error(error: CartsServiceError) -> StatusError {
    match error {
        CartsServiceError::AlreadyExists => StatusError::conflict().brief("Item already in cart"),
        CartsServiceError::NotFound => StatusError::not_found().brief("Cart item not found"),
        CartsServiceError::GameNotFound => StatusError::not_found().brief("Game not found"),
        CartsServiceError::AlreadyOwned => StatusError::bad_request().brief("already_owned"),
        CartsServiceError::InvalidQuantity => StatusError::bad_request().brief("invalid_quantity"),
        CartsServiceError::TotalOverflow => StatusError::bad_request().brief("invalid_cart"),
        CartsServiceError::InvalidReference
        | CartsServiceError::MissingRequiredData
        | CartsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid cart payload")
        }
        CartsServiceError::Sql(source) => {
            error!("cart storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
