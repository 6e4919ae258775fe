//! Game Records

use jiff::Timestamp;
use storefront_core::ranking::RankedGame;

use crate::uuids::TypedUuid;

/// Game UUID
pub type GameUuid = TypedUuid<GameRecord>;

/// Game Record
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub uuid: GameUuid,
    pub title: String,
    pub price: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Ranking Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingRecord {
    pub game: GameUuid,
    pub title: String,
    pub sales_count: u64,
    pub rank_position: u64,
}

impl From<&RankingRecord> for RankedGame {
    fn from(record: &RankingRecord) -> Self {
        Self {
            game: record.game.into_uuid(),
            sales_count: record.sales_count,
            rank_position: record.rank_position,
        }
    }
}
