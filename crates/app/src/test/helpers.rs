//! Test Helpers

use rust_decimal::Decimal;
use storefront_core::discounts::{DiscountKind, DiscountRules};

/// Unrestricted percent-off rules.
pub(crate) fn percent_rules(percentage: i64) -> DiscountRules {
    DiscountRules {
        kind: DiscountKind::Percent {
            percentage: Decimal::from(percentage),
        },
        min_total: 0,
        starts_at: None,
        ends_at: None,
        usage_limit: None,
        single_use_per_user: false,
    }
}

/// Unrestricted fixed-amount rules.
pub(crate) fn fixed_rules(amount: u64) -> DiscountRules {
    DiscountRules {
        kind: DiscountKind::Fixed { amount },
        ..percent_rules(0)
    }
}
