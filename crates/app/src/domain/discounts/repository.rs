//! Discounts Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use storefront_core::discounts::{DiscountKind, DiscountRules};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    amounts::{to_column_amount, try_get_amount, try_get_optional_amount},
    discounts::{
        data::{DiscountCodeUpdate, NewDiscountCode},
        patch::build_update,
        records::{DiscountCodeRecord, DiscountCodeUuid, DiscountUsageRecord, DiscountUsageUuid},
    },
    users::records::UserUuid,
};

const CREATE_CODE_SQL: &str = include_str!("sql/create_code.sql");
const GET_CODE_SQL: &str = include_str!("sql/get_code.sql");
const LOCK_CODE_SQL: &str = include_str!("sql/lock_code.sql");
const FIND_ACTIVE_CODE_SQL: &str = include_str!("sql/find_active_code.sql");
const LOCK_ACTIVE_CODE_SQL: &str = include_str!("sql/lock_active_code.sql");
const LIST_CODES_SQL: &str = include_str!("sql/list_codes.sql");
const COUNT_USAGES_SQL: &str = include_str!("sql/count_usages.sql");
const USED_BY_USER_SQL: &str = include_str!("sql/used_by_user.sql");
const CREATE_USAGE_SQL: &str = include_str!("sql/create_usage.sql");
const CLEAR_USAGES_SQL: &str = include_str!("sql/clear_usages.sql");
const DEACTIVATE_CODE_SQL: &str = include_str!("sql/deactivate_code.sql");
const DEACTIVATE_STALE_CODE_SQL: &str = include_str!("sql/deactivate_stale_code.sql");
const LIST_SWEEP_CANDIDATES_SQL: &str = include_str!("sql/list_sweep_candidates.sql");
const DETACH_PURCHASES_SQL: &str = include_str!("sql/detach_purchases.sql");
const DELETE_CODE_SQL: &str = include_str!("sql/delete_code.sql");

/// Columns returned for every discount code read.
pub(crate) const DISCOUNT_CODE_COLUMNS: &str = "uuid, code, kind, discount_percentage, \
     discount_amount, min_total, starts_at, ends_at, usage_limit, single_use_per_user, active, \
     created_at, updated_at";

/// How an active code lookup treats the row it finds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// Plain read.
    Read,

    /// Hold a row lock until the transaction ends.
    ForUpdate,
}

/// An active code the sweeper may need to deactivate.
#[derive(Debug, Clone)]
pub(crate) struct SweepCandidate {
    pub(crate) uuid: DiscountCodeUuid,
    pub(crate) code: String,
    pub(crate) usage_limit: Option<u64>,
    pub(crate) ends_at: Option<Timestamp>,
    pub(crate) usage_count: u64,
}

impl SweepCandidate {
    pub(crate) fn is_stale(&self, now: Timestamp) -> bool {
        let exhausted = self
            .usage_limit
            .is_some_and(|limit| self.usage_count >= limit);

        let expired = self.ends_at.is_some_and(|ends_at| ends_at < now);

        exhausted || expired
    }
}

#[derive(Debug, Error)]
#[error("discount kind {kind} does not match its value columns")]
struct InvalidDiscountColumns {
    kind: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgDiscountsRepository;

impl PgDiscountsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &NewDiscountCode,
    ) -> Result<DiscountCodeRecord, sqlx::Error> {
        let (kind, percentage, amount) = kind_columns(&code.rules.kind)?;

        query_as::<Postgres, DiscountCodeRecord>(CREATE_CODE_SQL)
            .bind(code.uuid.into_uuid())
            .bind(&code.code)
            .bind(kind)
            .bind(percentage)
            .bind(amount)
            .bind(to_column_amount("min_total", code.rules.min_total)?)
            .bind(code.rules.starts_at.map(SqlxTimestamp::from))
            .bind(code.rules.ends_at.map(SqlxTimestamp::from))
            .bind(
                code.rules
                    .usage_limit
                    .map(|limit| to_column_amount("usage_limit", limit))
                    .transpose()?,
            )
            .bind(code.rules.single_use_per_user)
            .bind(code.active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
    ) -> Result<DiscountCodeRecord, sqlx::Error> {
        query_as::<Postgres, DiscountCodeRecord>(GET_CODE_SQL)
            .bind(code.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn lock_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
    ) -> Result<DiscountCodeRecord, sqlx::Error> {
        query_as::<Postgres, DiscountCodeRecord>(LOCK_CODE_SQL)
            .bind(code.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Find an active code by its string. Inactive and unknown codes both yield `None`.
    pub(crate) async fn find_active_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        lookup: Lookup,
    ) -> Result<Option<DiscountCodeRecord>, sqlx::Error> {
        let sql = match lookup {
            Lookup::Read => FIND_ACTIVE_CODE_SQL,
            Lookup::ForUpdate => LOCK_ACTIVE_CODE_SQL,
        };

        query_as::<Postgres, DiscountCodeRecord>(sql)
            .bind(code)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn list_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<DiscountCodeRecord>, sqlx::Error> {
        query_as::<Postgres, DiscountCodeRecord>(LIST_CODES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    /// Apply a partial update. Returns `None` when the code does not exist.
    ///
    /// An empty patch must be rejected by the caller.
    pub(crate) async fn update_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
        update: &DiscountCodeUpdate,
    ) -> Result<Option<DiscountCodeRecord>, sqlx::Error> {
        let mut builder = build_update(code, update)?;

        builder
            .build_query_as::<DiscountCodeRecord>()
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn delete_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CODE_SQL)
            .bind(code.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Null out past purchases' reference to the code.
    pub(crate) async fn detach_purchases(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DETACH_PURCHASES_SQL)
            .bind(code.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn count_usages(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_USAGES_SQL)
            .bind(code.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(count).map_err(|e| sqlx::Error::ColumnDecode {
            index: "count".to_string(),
            source: Box::new(e),
        })
    }

    pub(crate) async fn used_by_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
        user: UserUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar(USED_BY_USER_SQL)
            .bind(code.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
        user: UserUuid,
    ) -> Result<DiscountUsageRecord, sqlx::Error> {
        query_as::<Postgres, DiscountUsageRecord>(CREATE_USAGE_SQL)
            .bind(DiscountUsageUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(code.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn clear_usages(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(CLEAR_USAGES_SQL)
            .bind(code.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Flip an active code inactive. Returns whether this call changed it.
    pub(crate) async fn deactivate_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(DEACTIVATE_CODE_SQL)
            .bind(code.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Deactivate the code only if it is still exhausted or expired at write time.
    pub(crate) async fn deactivate_stale_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: DiscountCodeUuid,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(DEACTIVATE_STALE_CODE_SQL)
            .bind(code.into_uuid())
            .bind(SqlxTimestamp::from(now))
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub(crate) async fn list_sweep_candidates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<SweepCandidate>, sqlx::Error> {
        query_as::<Postgres, SweepCandidate>(LIST_SWEEP_CANDIDATES_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

/// Storage columns (`kind`, `discount_percentage`, `discount_amount`) for a kind.
pub(crate) fn kind_columns(
    kind: &DiscountKind,
) -> Result<(&'static str, Option<Decimal>, Option<i64>), sqlx::Error> {
    match kind {
        DiscountKind::Percent { percentage } => Ok((kind.to_str(), Some(*percentage), None)),
        DiscountKind::Fixed { amount } => Ok((
            kind.to_str(),
            None,
            Some(to_column_amount("discount_amount", *amount)?),
        )),
    }
}

impl<'r> FromRow<'r, PgRow> for DiscountCodeRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let kind: String = row.try_get("kind")?;
        let percentage: Option<Decimal> = row.try_get("discount_percentage")?;
        let amount = try_get_optional_amount(row, "discount_amount")?;

        let kind = match (kind.as_str(), percentage, amount) {
            ("percent", Some(percentage), None) => DiscountKind::Percent { percentage },
            ("fixed", None, Some(amount)) => DiscountKind::Fixed { amount },
            _ => {
                return Err(sqlx::Error::ColumnDecode {
                    index: "kind".to_string(),
                    source: Box::new(InvalidDiscountColumns { kind }),
                });
            }
        };

        Ok(Self {
            uuid: DiscountCodeUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            rules: DiscountRules {
                kind,
                min_total: try_get_amount(row, "min_total")?,
                starts_at: row
                    .try_get::<Option<SqlxTimestamp>, _>("starts_at")?
                    .map(SqlxTimestamp::to_jiff),
                ends_at: row
                    .try_get::<Option<SqlxTimestamp>, _>("ends_at")?
                    .map(SqlxTimestamp::to_jiff),
                usage_limit: try_get_optional_amount(row, "usage_limit")?,
                single_use_per_user: row.try_get("single_use_per_user")?,
            },
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for DiscountUsageRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: DiscountUsageUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get::<Uuid, _>("user_uuid")?),
            discount_code: DiscountCodeUuid::from_uuid(
                row.try_get::<Uuid, _>("discount_code_uuid")?,
            ),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for SweepCandidate {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: DiscountCodeUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            usage_limit: try_get_optional_amount(row, "usage_limit")?,
            ends_at: row
                .try_get::<Option<SqlxTimestamp>, _>("ends_at")?
                .map(SqlxTimestamp::to_jiff),
            usage_count: try_get_amount(row, "usage_count")?,
        })
    }
}
