//! Discount Data

use jiff::Timestamp;
use storefront_core::discounts::{DiscountKind, DiscountRules};

use crate::domain::{amounts::fits_column, discounts::records::DiscountCodeUuid};

fn kind_fits(kind: &DiscountKind) -> bool {
    match kind {
        DiscountKind::Percent { .. } => true,
        DiscountKind::Fixed { amount } => fits_column(*amount),
    }
}

/// New Discount Code Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDiscountCode {
    pub uuid: DiscountCodeUuid,
    pub code: String,
    pub rules: DiscountRules,
    pub active: bool,
}

impl NewDiscountCode {
    /// Whether every amount and limit fits its storage column.
    #[must_use]
    pub fn amounts_fit(&self) -> bool {
        kind_fits(&self.rules.kind)
            && fits_column(self.rules.min_total)
            && self.rules.usage_limit.is_none_or(fits_column)
    }
}

/// Partial update of a discount code. `None` leaves a column untouched; for
/// nullable columns `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscountCodeUpdate {
    pub code: Option<String>,
    pub kind: Option<DiscountKind>,
    pub min_total: Option<u64>,
    pub starts_at: Option<Option<Timestamp>>,
    pub ends_at: Option<Option<Timestamp>>,
    pub usage_limit: Option<Option<u64>>,
    pub single_use_per_user: Option<bool>,
    pub active: Option<bool>,
}

impl DiscountCodeUpdate {
    /// Whether the patch sets nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Whether every amount and limit the patch sets fits its storage column.
    #[must_use]
    pub fn amounts_fit(&self) -> bool {
        self.kind.as_ref().is_none_or(kind_fits)
            && self.min_total.is_none_or(fits_column)
            && self.usage_limit.flatten().is_none_or(fits_column)
    }

    /// Whether applying this patch to a code with the given `active` flag would
    /// reactivate it.
    #[must_use]
    pub fn reactivates(&self, currently_active: bool) -> bool {
        !currently_active && self.active == Some(true)
    }
}
