//! Wallet Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::users::UsersServiceError;

pub(crate) fn into_status_error(error: UsersServiceError) -> StatusError {
    match error {
        UsersServiceError::NotFound => StatusError::not_found().brief("User not found"),
        UsersServiceError::InvalidAmount => StatusError::bad_request().brief("invalid_amount"),
        UsersServiceError::AlreadyExists => StatusError::conflict(),
        UsersServiceError::InvalidReference
        | UsersServiceError::MissingRequiredData
        | UsersServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid wallet payload")
        }
        UsersServiceError::Sql(source) => {
            error!("wallet storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
