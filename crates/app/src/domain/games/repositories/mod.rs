//! Game Repositories

mod games;
mod ranking;

pub(crate) use games::PgGamesRepository;
pub(crate) use ranking::PgRankingRepository;
