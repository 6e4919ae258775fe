//! Checkout Models

use jiff::Timestamp;

use crate::domain::{
    checkout::records::{PurchaseItemRecord, PurchaseRecord, PurchaseUuid},
    discounts::records::DiscountCodeUuid,
    users::records::UserUuid,
};

/// Result of a committed checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutReceipt {
    pub purchase: PurchaseRecord,
    pub items: Vec<PurchaseItemRecord>,

    /// Redeemed code string, if a discount applied.
    pub discount_code: Option<String>,

    /// Distinct games bought.
    pub games_count: u64,

    /// Units bought across all lines.
    pub items_count: u64,

    /// Wallet balance after the debit.
    pub balance: u64,
}

/// A past purchase with its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Purchase {
    pub uuid: PurchaseUuid,
    pub user: UserUuid,
    pub total: u64,
    pub discount_amount: u64,
    pub final_amount: u64,
    pub discount_code: Option<DiscountCodeUuid>,
    pub items: Vec<PurchaseItemRecord>,
    pub created_at: Timestamp,
}

impl Purchase {
    pub(crate) fn from_parts(record: PurchaseRecord, items: Vec<PurchaseItemRecord>) -> Self {
        Self {
            uuid: record.uuid,
            user: record.user,
            total: record.total,
            discount_amount: record.discount_amount,
            final_amount: record.final_amount,
            discount_code: record.discount_code,
            items,
            created_at: record.created_at,
        }
    }
}
