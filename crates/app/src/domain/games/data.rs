//! Game Data

use crate::domain::games::records::GameUuid;

/// New Game Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub uuid: GameUuid,
    pub title: String,
    pub price: u64,
}
