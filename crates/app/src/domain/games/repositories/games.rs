//! Games Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::domain::{
    amounts::{to_column_amount, try_get_amount},
    games::{
        data::NewGame,
        records::{GameRecord, GameUuid},
    },
};

const CREATE_GAME_SQL: &str = include_str!("../sql/create_game.sql");
const GET_GAME_SQL: &str = include_str!("../sql/get_game.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgGamesRepository;

impl PgGamesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_game(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        game: &NewGame,
    ) -> Result<GameRecord, sqlx::Error> {
        query_as::<Postgres, GameRecord>(CREATE_GAME_SQL)
            .bind(game.uuid.into_uuid())
            .bind(&game.title)
            .bind(to_column_amount("price", game.price)?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_game(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        game: GameUuid,
    ) -> Result<Option<GameRecord>, sqlx::Error> {
        query_as::<Postgres, GameRecord>(GET_GAME_SQL)
            .bind(game.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for GameRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: GameUuid::from_uuid(row.try_get("uuid")?),
            title: row.try_get("title")?,
            price: try_get_amount(row, "price")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
