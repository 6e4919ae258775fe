//! Cart Data

use crate::domain::games::records::GameUuid;

/// New Cart Item Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub game: GameUuid,
    pub quantity: u32,
}
