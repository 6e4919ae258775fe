//! Discount Records

use jiff::Timestamp;
use storefront_core::discounts::DiscountRules;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Discount Code UUID
pub type DiscountCodeUuid = TypedUuid<DiscountCodeRecord>;

/// Discount Code Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountCodeRecord {
    pub uuid: DiscountCodeUuid,
    pub code: String,
    pub rules: DiscountRules,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Discount Usage UUID
pub type DiscountUsageUuid = TypedUuid<DiscountUsageRecord>;

/// One redemption of a discount code by a user.
#[derive(Debug, Clone)]
pub struct DiscountUsageRecord {
    pub uuid: DiscountUsageUuid,
    pub user: UserUuid,
    pub discount_code: DiscountCodeUuid,
    pub created_at: Timestamp,
}
