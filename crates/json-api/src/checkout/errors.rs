//! Checkout Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use storefront_app::domain::checkout::CheckoutServiceError;

pub(crate) fn into_status_error(error: CheckoutServiceError) -> StatusError {
    match error {
        CheckoutServiceError::Rejected(rejection) => StatusError::bad_request()
            .brief(rejection.reason())
            .detail(rejection.to_string()),
        CheckoutServiceError::NotFound => StatusError::not_found().brief("User not found"),
        CheckoutServiceError::InvalidReference
        | CheckoutServiceError::MissingRequiredData
        | CheckoutServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid checkout")
        }
        CheckoutServiceError::LockTimeout => {
            warn!("checkout timed out waiting for a lock");

            StatusError::internal_server_error()
                .brief("Checkout busy")
                .detail("nothing was charged; the checkout may be resubmitted")
        }
        CheckoutServiceError::IllegalTransition(transition) => {
            error!("checkout state machine fault: {transition}");

            StatusError::internal_server_error()
        }
        CheckoutServiceError::Sql(source) => {
            error!("failed to check out: {source}");

            StatusError::internal_server_error()
        }
    }
}
