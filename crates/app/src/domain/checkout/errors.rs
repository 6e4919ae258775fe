//! Checkout service errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use storefront_core::checkout::{CheckoutRejection, IllegalTransition};
use thiserror::Error;

/// `lock_not_available`, raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

#[derive(Debug, Error)]
pub enum CheckoutServiceError {
    /// A business rule refused the checkout. Nothing was written.
    #[error("checkout rejected: {0}")]
    Rejected(#[from] CheckoutRejection),

    #[error("user or cart not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),

    /// A row lock could not be taken in time; the checkout may be resubmitted.
    #[error("timed out waiting for a lock")]
    LockTimeout,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl CheckoutServiceError {
    /// Short machine-readable reason for a rejection.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&'static str> {
        match self {
            Self::Rejected(rejection) => Some(rejection.reason()),
            _ => None,
        }
    }
}

impl From<Error> for CheckoutServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if error
            .as_database_error()
            .and_then(DatabaseError::code)
            .is_some_and(|code| code == LOCK_NOT_AVAILABLE)
        {
            return Self::LockTimeout;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::UniqueViolation | ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}
