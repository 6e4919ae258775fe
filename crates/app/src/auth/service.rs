//! Auth service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    auth::{
        AuthServiceError, IssuedSession, Principal, format_session_token,
        generate_session_secret, hash_session_secret, parse_session_token,
        repository::PgAuthRepository,
    },
    database::Db,
    domain::users::records::UserUuid,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            repository: PgAuthRepository::new(db.pool().clone()),
        }
    }

    /// Issue a new session token for the given user.
    ///
    /// The raw token is only ever returned here; storage keeps its hash.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::UnknownUser`] if the user does not exist, or an
    /// error if the database insertion fails.
    pub async fn issue_session(
        &self,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<IssuedSession, AuthServiceError> {
        let secret = generate_session_secret();
        let token = format_session_token(&secret);

        let session = self
            .repository
            .create_session(&hash_session_secret(&secret), user, expires_at)
            .await?;

        info!(user_uuid = %user, "issued session");

        Ok(IssuedSession {
            token,
            user: session.user,
            created_at: session.created_at,
            expires_at: session.expires_at,
        })
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError> {
        let secret = parse_session_token(bearer_token).map_err(|_| AuthServiceError::NotFound)?;

        self.repository
            .find_principal_by_token_hash(&hash_session_secret(&secret))
            .await?
            .ok_or(AuthServiceError::NotFound)
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Resolve a bearer token to the user it was issued for.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Principal, AuthServiceError>;
}
