//! Cart Records

use jiff::Timestamp;
use storefront_core::cart::CartLine;

use crate::{
    domain::{games::records::GameUuid, users::records::UserUuid},
    uuids::TypedUuid,
};

/// Cart UUID
pub type CartUuid = TypedUuid<CartRecord>;

/// Cart Record
#[derive(Debug, Clone)]
pub struct CartRecord {
    pub uuid: CartUuid,
    pub user: UserUuid,
    pub created_at: Timestamp,
}

/// Cart Item Record, priced at the game's current price.
#[derive(Debug, Clone)]
pub struct CartItemRecord {
    pub cart: CartUuid,
    pub game: GameUuid,
    pub title: String,
    pub unit_price: u64,
    pub quantity: u32,
    pub created_at: Timestamp,
}

impl From<CartItemRecord> for CartLine {
    fn from(item: CartItemRecord) -> Self {
        Self {
            game: item.game.into_uuid(),
            title: item.title,
            unit_price: item.unit_price,
            quantity: item.quantity,
        }
    }
}
