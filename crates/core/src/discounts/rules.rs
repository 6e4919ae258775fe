//! Discount eligibility rules
//!
//! [`evaluate`] decides whether a discount code may be redeemed against an order and,
//! if so, how much it takes off. It is side-effect free: callers look the code up,
//! count its redemptions and act on the verdict (recording usage, deactivating an
//! exhausted code) themselves.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::discounts::{AppliedDiscount, DiscountError, DiscountKind, apply};

/// Why a discount code cannot be redeemed.
///
/// Variants are listed in the order the checks run; the first failing check wins.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscountRejection {
    /// No active code with this string exists. Produced by the code lookup, never
    /// by [`evaluate`].
    #[error("discount code not found")]
    CodeNotFound,

    /// The validity window has not started yet.
    #[error("discount code is not valid until {starts_at}")]
    NotYetValid {
        /// Start of the validity window.
        starts_at: Timestamp,
    },

    /// The validity window has ended.
    #[error("discount code expired at {ends_at}")]
    Expired {
        /// End of the validity window.
        ends_at: Timestamp,
    },

    /// The order total is below the code's minimum.
    #[error("order total {total} is below the minimum of {minimum}")]
    BelowMinimum {
        /// Required minimum order total.
        minimum: u64,

        /// Actual order total.
        total: u64,
    },

    /// The code has been redeemed as many times as its limit allows.
    #[error("discount code usage limit of {limit} reached")]
    UsageLimitReached {
        /// Maximum number of redemptions.
        limit: u64,

        /// Redemptions recorded so far.
        used: u64,
    },

    /// The code is single-use per user and this user already redeemed it.
    #[error("discount code already used")]
    AlreadyUsed,

    /// The discount amount could not be calculated.
    #[error(transparent)]
    Calculation(#[from] DiscountError),
}

impl DiscountRejection {
    /// Short machine-readable reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::CodeNotFound => "code_not_found",
            Self::NotYetValid { .. } => "not_yet_valid",
            Self::Expired { .. } => "expired",
            Self::BelowMinimum { .. } => "below_minimum",
            Self::UsageLimitReached { .. } => "usage_limit_reached",
            Self::AlreadyUsed => "already_used",
            Self::Calculation(_) => "invalid_discount",
        }
    }
}

/// Eligibility rules and pricing of a discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRules {
    /// How the code reduces the total.
    pub kind: DiscountKind,

    /// Minimum order total in minor units; zero means no minimum.
    pub min_total: u64,

    /// Start of the validity window, if any.
    pub starts_at: Option<Timestamp>,

    /// End of the validity window, if any.
    pub ends_at: Option<Timestamp>,

    /// Maximum number of redemptions across all users, if any.
    pub usage_limit: Option<u64>,

    /// Whether each user may redeem the code at most once.
    pub single_use_per_user: bool,
}

impl DiscountRules {
    /// Whether the usage limit is reached at `used` redemptions.
    #[must_use]
    pub fn is_exhausted(&self, used: u64) -> bool {
        self.usage_limit.is_some_and(|limit| used >= limit)
    }

    /// Whether the validity window has closed at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.ends_at.is_some_and(|ends_at| now > ends_at)
    }
}

/// Facts about the redemption attempt that [`evaluate`] checks the rules against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionContext {
    /// Order total in minor units.
    pub total: u64,

    /// Evaluation time.
    pub now: Timestamp,

    /// Number of redemptions recorded for the code.
    pub usage_count: u64,

    /// Whether the redeeming user already has a redemption of this code.
    pub used_by_user: bool,
}

/// Evaluate a discount code against an order.
///
/// Checks run in a fixed order and the first failure is returned:
///
/// 1. validity window start
/// 2. validity window end
/// 3. minimum order total
/// 4. global usage limit
/// 5. single use per user
///
/// # Errors
///
/// Returns the first [`DiscountRejection`] that applies.
pub fn evaluate(
    rules: &DiscountRules,
    context: &RedemptionContext,
) -> Result<AppliedDiscount, DiscountRejection> {
    if let Some(starts_at) = rules.starts_at
        && context.now < starts_at
    {
        return Err(DiscountRejection::NotYetValid { starts_at });
    }

    if let Some(ends_at) = rules.ends_at
        && context.now > ends_at
    {
        return Err(DiscountRejection::Expired { ends_at });
    }

    if rules.min_total > 0 && context.total < rules.min_total {
        return Err(DiscountRejection::BelowMinimum {
            minimum: rules.min_total,
            total: context.total,
        });
    }

    if let Some(limit) = rules.usage_limit
        && context.usage_count >= limit
    {
        return Err(DiscountRejection::UsageLimitReached {
            limit,
            used: context.usage_count,
        });
    }

    if rules.single_use_per_user && context.used_by_user {
        return Err(DiscountRejection::AlreadyUsed);
    }

    Ok(apply(&rules.kind, context.total)?)
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    fn rules() -> DiscountRules {
        DiscountRules {
            kind: DiscountKind::Percent {
                percentage: Decimal::from(10),
            },
            min_total: 0,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
            single_use_per_user: false,
        }
    }

    fn context(total: u64) -> RedemptionContext {
        RedemptionContext {
            total,
            now: Timestamp::now(),
            usage_count: 0,
            used_by_user: false,
        }
    }

    #[test]
    fn unrestricted_code_applies() -> TestResult {
        let applied = evaluate(&rules(), &context(100_00))?;

        assert_eq!(applied.discount_amount, 10_00);
        assert_eq!(applied.final_amount, 90_00);

        Ok(())
    }

    #[test]
    fn calculation_rejection_keeps_its_cause_when_cloned() {
        let rejection = DiscountRejection::from(DiscountError::PercentConversion);
        let copy = rejection.clone();

        assert_eq!(copy, rejection);
        assert_eq!(copy.reason(), "invalid_discount");
    }

    #[test]
    fn code_before_start_is_not_yet_valid() {
        let ctx = context(100_00);
        let starts_at = ctx.now + SignedDuration::from_hours(1);

        let result = evaluate(
            &DiscountRules {
                starts_at: Some(starts_at),
                ..rules()
            },
            &ctx,
        );

        assert_eq!(result, Err(DiscountRejection::NotYetValid { starts_at }));
    }

    #[test]
    fn code_after_end_is_expired() {
        let ctx = context(100_00);
        let ends_at = ctx.now - SignedDuration::from_hours(24);

        let result = evaluate(
            &DiscountRules {
                ends_at: Some(ends_at),
                ..rules()
            },
            &ctx,
        );

        assert_eq!(result, Err(DiscountRejection::Expired { ends_at }));
    }

    #[test]
    fn total_below_minimum_is_rejected() {
        let result = evaluate(
            &DiscountRules {
                min_total: 50_00,
                ..rules()
            },
            &context(49_99),
        );

        assert_eq!(
            result,
            Err(DiscountRejection::BelowMinimum {
                minimum: 50_00,
                total: 49_99
            })
        );
    }

    #[test]
    fn exhausted_code_is_rejected() {
        let result = evaluate(
            &DiscountRules {
                usage_limit: Some(5),
                ..rules()
            },
            &RedemptionContext {
                usage_count: 5,
                ..context(100_00)
            },
        );

        assert_eq!(
            result,
            Err(DiscountRejection::UsageLimitReached { limit: 5, used: 5 })
        );
    }

    #[test]
    fn one_redemption_left_still_applies() -> TestResult {
        let applied = evaluate(
            &DiscountRules {
                usage_limit: Some(5),
                ..rules()
            },
            &RedemptionContext {
                usage_count: 4,
                ..context(100_00)
            },
        )?;

        assert_eq!(applied.final_amount, 90_00);

        Ok(())
    }

    #[test]
    fn single_use_code_used_by_user_is_rejected() {
        let result = evaluate(
            &DiscountRules {
                single_use_per_user: true,
                ..rules()
            },
            &RedemptionContext {
                used_by_user: true,
                ..context(100_00)
            },
        );

        assert_eq!(result, Err(DiscountRejection::AlreadyUsed));
    }

    #[test]
    fn reused_code_without_single_use_flag_applies() {
        let result = evaluate(
            &rules(),
            &RedemptionContext {
                used_by_user: true,
                ..context(100_00)
            },
        );

        assert!(result.is_ok(), "expected discount to apply, got {result:?}");
    }

    #[test]
    fn expiry_is_checked_before_minimum() {
        let ctx = context(1);
        let ends_at = ctx.now - SignedDuration::from_secs(1);

        let result = evaluate(
            &DiscountRules {
                ends_at: Some(ends_at),
                min_total: 100_00,
                usage_limit: Some(1),
                ..rules()
            },
            &RedemptionContext {
                usage_count: 1,
                ..ctx
            },
        );

        assert_eq!(result, Err(DiscountRejection::Expired { ends_at }));
    }

    #[test]
    fn usage_limit_is_checked_before_single_use() {
        let result = evaluate(
            &DiscountRules {
                usage_limit: Some(1),
                single_use_per_user: true,
                ..rules()
            },
            &RedemptionContext {
                usage_count: 1,
                used_by_user: true,
                ..context(100_00)
            },
        );

        assert!(
            matches!(result, Err(DiscountRejection::UsageLimitReached { .. })),
            "expected UsageLimitReached, got {result:?}"
        );
    }

    #[test]
    fn is_exhausted_without_limit_is_false() {
        assert!(!rules().is_exhausted(u64::MAX));
    }
}
