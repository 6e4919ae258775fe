//! Auth data models.

use jiff::Timestamp;

use crate::domain::users::records::UserUuid;

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user: UserUuid,
    pub is_admin: bool,
}

/// Session issuance result with the one-time raw token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user: UserUuid,
    pub created_at: Timestamp,
    pub expires_at: Option<Timestamp>,
}
