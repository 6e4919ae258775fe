//! Users Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    amounts::{to_column_amount, try_get_amount},
    users::{
        data::NewUser,
        records::{
            UserRecord, UserUuid, WalletTransactionKind, WalletTransactionRecord,
            WalletTransactionUuid,
        },
    },
};

const CREATE_USER_SQL: &str = include_str!("sql/create_user.sql");
const GET_USER_SQL: &str = include_str!("sql/get_user.sql");
const LOCK_USER_SQL: &str = include_str!("sql/lock_user.sql");
const DEBIT_WALLET_SQL: &str = include_str!("sql/debit_wallet.sql");
const CREDIT_WALLET_SQL: &str = include_str!("sql/credit_wallet.sql");
const CREATE_WALLET_TRANSACTION_SQL: &str = include_str!("sql/create_wallet_transaction.sql");
const LIST_WALLET_TRANSACTIONS_SQL: &str = include_str!("sql/list_wallet_transactions.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUsersRepository;

impl PgUsersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: &NewUser,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(CREATE_USER_SQL)
            .bind(user.uuid.into_uuid())
            .bind(&user.email)
            .bind(user.is_admin)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(GET_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Read the user row and hold its lock until the transaction ends.
    ///
    /// Every wallet mutation takes this lock first, which serialises checkouts and
    /// deposits of one user.
    pub(crate) async fn lock_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<UserRecord, sqlx::Error> {
        query_as::<Postgres, UserRecord>(LOCK_USER_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Debit the wallet only if it still covers `amount`.
    ///
    /// Returns the new balance, or `None` when the balance is insufficient.
    pub(crate) async fn debit_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        amount: u64,
    ) -> Result<Option<u64>, sqlx::Error> {
        let balance: Option<i64> = query_scalar(DEBIT_WALLET_SQL)
            .bind(user.into_uuid())
            .bind(to_column_amount("amount", amount)?)
            .fetch_optional(&mut **tx)
            .await?;

        balance.map(decode_balance).transpose()
    }

    pub(crate) async fn credit_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        amount: u64,
    ) -> Result<u64, sqlx::Error> {
        let balance: i64 = query_scalar(CREDIT_WALLET_SQL)
            .bind(user.into_uuid())
            .bind(to_column_amount("amount", amount)?)
            .fetch_one(&mut **tx)
            .await?;

        decode_balance(balance)
    }

    pub(crate) async fn create_wallet_transaction(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        kind: WalletTransactionKind,
        amount: u64,
        description: &str,
    ) -> Result<WalletTransactionRecord, sqlx::Error> {
        query_as::<Postgres, WalletTransactionRecord>(CREATE_WALLET_TRANSACTION_SQL)
            .bind(WalletTransactionUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(kind.as_str())
            .bind(to_column_amount("amount", amount)?)
            .bind(description)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_wallet_transactions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<WalletTransactionRecord>, sqlx::Error> {
        query_as::<Postgres, WalletTransactionRecord>(LIST_WALLET_TRANSACTIONS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

fn decode_balance(balance: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(balance).map_err(|e| sqlx::Error::ColumnDecode {
        index: "wallet_balance".to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for UserRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: UserUuid::from_uuid(row.try_get("uuid")?),
            email: row.try_get("email")?,
            is_admin: row.try_get("is_admin")?,
            wallet_balance: try_get_amount(row, "wallet_balance")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for WalletTransactionRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("kind")?;

        let kind = kind
            .parse::<WalletTransactionKind>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "kind".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: WalletTransactionUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            kind,
            amount: try_get_amount(row, "amount")?,
            description: row.try_get("description")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
