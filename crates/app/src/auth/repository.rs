//! Auth repository.

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{auth::models::Principal, domain::users::records::UserUuid};

const CREATE_SESSION_SQL: &str = include_str!("sql/create_session.sql");
const FIND_PRINCIPAL_BY_TOKEN_HASH_SQL: &str = include_str!("sql/find_principal_by_token_hash.sql");

/// Stored session, without its token hash.
#[derive(Debug, Clone)]
pub(crate) struct SessionRecord {
    pub(crate) user: UserUuid,
    pub(crate) created_at: Timestamp,
    pub(crate) expires_at: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub(crate) struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    #[must_use]
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) async fn create_session(
        &self,
        token_hash: &str,
        user: UserUuid,
        expires_at: Option<Timestamp>,
    ) -> Result<SessionRecord, sqlx::Error> {
        query_as::<Postgres, SessionRecord>(CREATE_SESSION_SQL)
            .bind(token_hash)
            .bind(user.into_uuid())
            .bind(expires_at.map(SqlxTimestamp::from))
            .fetch_one(&self.pool)
            .await
    }

    /// Find the user behind an unexpired session.
    pub(crate) async fn find_principal_by_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<Principal>, sqlx::Error> {
        query_as::<Postgres, Principal>(FIND_PRINCIPAL_BY_TOKEN_HASH_SQL)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for SessionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            expires_at: row
                .try_get::<Option<SqlxTimestamp>, _>("expires_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Principal {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            user: UserUuid::from_uuid(row.try_get::<Uuid, _>("uuid")?),
            is_admin: row.try_get("is_admin")?,
        })
    }
}
