//! Rankings Handler

use std::sync::Arc;

use salvo::{oapi::ToSchema, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::games::records::RankingRecord;

use crate::{extensions::*, games::errors::into_status_error, state::State};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RankingResponse {
    pub game_uuid: Uuid,
    pub title: String,
    pub sales_count: u64,

    /// Dense rank, 1 for the best seller
    pub rank_position: u64,
}

impl From<RankingRecord> for RankingResponse {
    fn from(record: RankingRecord) -> Self {
        RankingResponse {
            game_uuid: record.game.into_uuid(),
            title: record.title,
            sales_count: record.sales_count,
            rank_position: record.rank_position,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RankingsResponse {
    pub rankings: Vec<RankingResponse>,
}

/// Rankings Handler
///
/// Games ordered by sales, best seller first. Ties share a position.
#[endpoint(
    tags("games"),
    summary = "Sales Ranking",
    security(("bearer_auth" = []))
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<RankingsResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let rankings = state
        .app
        .games
        .list_rankings()
        .await
        .map_err(into_status_error)?;

    Ok(Json(RankingsResponse {
        rankings: rankings.into_iter().map(Into::into).collect(),
    }))
}
