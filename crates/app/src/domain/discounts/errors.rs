//! Discounts service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront_core::discounts::{DiscountError, DiscountRejection};
use thiserror::Error;

use crate::domain::amounts::is_out_of_range;

#[derive(Debug, Error)]
pub enum DiscountsServiceError {
    #[error("discount code already exists")]
    AlreadyExists,

    #[error("discount code not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("update does not change anything")]
    EmptyUpdate,

    #[error("invalid discount value")]
    InvalidDiscount(#[from] DiscountError),

    #[error("discount code rejected: {0}")]
    Rejected(#[from] DiscountRejection),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for DiscountsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if is_out_of_range(&error) {
            return Self::InvalidData;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
