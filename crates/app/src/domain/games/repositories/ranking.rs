//! Ranking Repository
//!
//! Sales counters and their dense rank. Writers must hold the ranking advisory
//! lock ([`PgRankingRepository::lock`]) for the rest of their transaction; the
//! lock serialises the full re-rank so concurrent checkouts cannot interleave
//! partial rank updates.

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    amounts::{to_column_amount, try_get_amount},
    games::records::{GameUuid, RankingRecord},
};

const CREATE_RANKING_SQL: &str = include_str!("../sql/create_ranking.sql");
const LOCK_RANKING_SQL: &str = include_str!("../sql/lock_ranking.sql");
const INCREMENT_SALES_SQL: &str = include_str!("../sql/increment_sales.sql");
const RECOMPUTE_RANK_POSITIONS_SQL: &str = include_str!("../sql/recompute_rank_positions.sql");
const LIST_RANKING_SQL: &str = include_str!("../sql/list_ranking.sql");

/// Advisory lock key guarding ranking writes.
pub(crate) const RANKING_LOCK_KEY: i64 = 0x0052_414e_4b49_4e47;

#[derive(Debug, Clone, Default)]
pub(crate) struct PgRankingRepository;

impl PgRankingRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Take the transaction-scoped ranking lock.
    pub(crate) async fn lock(&self, tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
        query(LOCK_RANKING_SQL)
            .bind(RANKING_LOCK_KEY)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn create_ranking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        game: GameUuid,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_RANKING_SQL)
            .bind(game.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Add `units` to each game's sales counter, in game order.
    pub(crate) async fn increment_sales(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        sales: &[(Uuid, u64)],
    ) -> Result<(), sqlx::Error> {
        let mut sorted = sales.to_vec();

        sorted.sort_unstable_by_key(|(game, _)| *game);

        for (game, units) in sorted {
            query(INCREMENT_SALES_SQL)
                .bind(game)
                .bind(to_column_amount("sales_count", units)?)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    /// Re-rank every game by sales count (dense rank, best seller first).
    ///
    /// Returns the number of rows whose position changed.
    pub(crate) async fn recompute_rank_positions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(RECOMPUTE_RANK_POSITIONS_SQL)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn list_ranking(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<RankingRecord>, sqlx::Error> {
        query_as::<Postgres, RankingRecord>(LIST_RANKING_SQL)
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for RankingRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            game: GameUuid::from_uuid(row.try_get::<Uuid, _>("game_uuid")?),
            title: row.try_get("title")?,
            sales_count: try_get_amount(row, "sales_count")?,
            rank_position: try_get_amount(row, "rank_position")?,
        })
    }
}
