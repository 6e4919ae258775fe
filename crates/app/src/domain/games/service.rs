//! Games Service

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

use crate::{
    database::Db,
    domain::games::{
        GamesServiceError,
        data::NewGame,
        records::{GameRecord, GameUuid, RankingRecord},
        repositories::{PgGamesRepository, PgRankingRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgGamesService {
    db: Db,
    games: PgGamesRepository,
    ranking: PgRankingRepository,
}

impl PgGamesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            games: PgGamesRepository::new(),
            ranking: PgRankingRepository::new(),
        }
    }
}

#[async_trait]
impl GamesService for PgGamesService {
    #[tracing::instrument(
        name = "games.service.create_game",
        skip(self, game),
        fields(game_uuid = %game.uuid, price = game.price),
        err
    )]
    async fn create_game(&self, game: NewGame) -> Result<GameRecord, GamesServiceError> {
        if game.price == 0 {
            return Err(GamesServiceError::InvalidPrice);
        }

        let mut tx = self.db.begin_transaction().await?;

        let record = self.games.create_game(&mut tx, &game).await?;

        self.ranking.lock(&mut tx).await?;
        self.ranking.create_ranking(&mut tx, record.uuid).await?;
        self.ranking.recompute_rank_positions(&mut tx).await?;

        tx.commit().await?;

        info!(game_uuid = %record.uuid, "created game");

        Ok(record)
    }

    async fn get_game(&self, game: GameUuid) -> Result<GameRecord, GamesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .games
            .find_game(&mut tx, game)
            .await?
            .ok_or(GamesServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    async fn list_rankings(&self) -> Result<Vec<RankingRecord>, GamesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let ranking = self.ranking.list_ranking(&mut tx).await?;

        tx.commit().await?;

        Ok(ranking)
    }
}

#[automock]
#[async_trait]
pub trait GamesService: Send + Sync {
    /// Add a game to the catalog with an empty sales counter.
    async fn create_game(&self, game: NewGame) -> Result<GameRecord, GamesServiceError>;

    /// Retrieve a single game.
    async fn get_game(&self, game: GameUuid) -> Result<GameRecord, GamesServiceError>;

    /// Sales ranking, best seller first.
    async fn list_rankings(&self) -> Result<Vec<RankingRecord>, GamesServiceError>;
}
