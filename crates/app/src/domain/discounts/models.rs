//! Discount Models

use storefront_core::discounts::AppliedDiscount;

use crate::domain::discounts::records::DiscountCodeUuid;

/// Outcome of a successful redemption preview. Nothing is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountPreview {
    pub discount_code: DiscountCodeUuid,
    pub code: String,
    pub applied: AppliedDiscount,
}
