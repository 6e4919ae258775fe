//! Purchase Records

use jiff::Timestamp;

use crate::{
    domain::{
        discounts::records::DiscountCodeUuid, games::records::GameUuid,
        users::records::UserUuid,
    },
    uuids::TypedUuid,
};

/// Purchase UUID
pub type PurchaseUuid = TypedUuid<PurchaseRecord>;

/// Purchase Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    pub uuid: PurchaseUuid,
    pub user: UserUuid,
    pub total: u64,
    pub discount_amount: u64,
    pub final_amount: u64,

    /// Redeemed code, cleared if the code is later deleted.
    pub discount_code: Option<DiscountCodeUuid>,
    pub created_at: Timestamp,
}

/// Purchase Item UUID
pub type PurchaseItemUuid = TypedUuid<PurchaseItemRecord>;

/// One purchased game, priced as it was at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseItemRecord {
    pub uuid: PurchaseItemUuid,
    pub purchase: PurchaseUuid,
    pub game: GameUuid,
    pub quantity: u32,
    pub price_at_purchase: u64,
}
