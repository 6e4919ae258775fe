//! Discount Code Errors

use salvo::http::StatusError;
use tracing::error;

use storefront_app::domain::discounts::DiscountsServiceError;
use storefront_core::discounts::DiscountRejection;

pub(crate) fn into_status_error(error: DiscountsServiceError) -> StatusError {
    match error {
        DiscountsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Discount code already exists")
        }
        DiscountsServiceError::NotFound => StatusError::not_found().brief("Discount code not found"),
        DiscountsServiceError::Rejected(DiscountRejection::CodeNotFound) => {
            StatusError::not_found().brief(DiscountRejection::CodeNotFound.reason())
        }
        DiscountsServiceError::Rejected(rejection) => StatusError::bad_request()
            .brief(rejection.reason())
            .detail(rejection.to_string()),
        DiscountsServiceError::InvalidDiscount(source) => StatusError::bad_request()
            .brief("invalid_discount")
            .detail(source.to_string()),
        DiscountsServiceError::EmptyUpdate => {
            StatusError::bad_request().brief("Update does not change anything")
        }
        DiscountsServiceError::InvalidReference
        | DiscountsServiceError::MissingRequiredData
        | DiscountsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid discount code payload")
        }
        DiscountsServiceError::Sql(source) => {
            error!("discount code storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
