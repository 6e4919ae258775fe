//! Discount Evaluator
//!
//! Gathers what the eligibility rules need (the code, its redemption count and
//! whether this user already redeemed it) inside the caller's transaction and runs
//! the rules over it.

use jiff::Timestamp;
use sqlx::{Postgres, Transaction};
use storefront_core::discounts::{AppliedDiscount, DiscountRejection, RedemptionContext, evaluate};

use crate::domain::{
    discounts::{
        records::DiscountCodeRecord,
        repository::{Lookup, PgDiscountsRepository},
    },
    users::records::UserUuid,
};

/// A code that was found, with the rules' verdict on it.
#[derive(Debug, Clone)]
pub(crate) struct Evaluation {
    pub(crate) code: DiscountCodeRecord,
    pub(crate) usage_count: u64,
    pub(crate) verdict: Result<AppliedDiscount, DiscountRejection>,
}

impl Evaluation {
    /// Whether the verdict says the code has no redemptions left.
    pub(crate) fn is_exhausted(&self) -> bool {
        matches!(
            self.verdict,
            Err(DiscountRejection::UsageLimitReached { .. })
        )
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DiscountEvaluator {
    discounts: PgDiscountsRepository,
}

impl DiscountEvaluator {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            discounts: PgDiscountsRepository::new(),
        }
    }

    /// Evaluate `code` for `user` against an order `total`.
    ///
    /// Returns `None` when there is no active code with that string. With
    /// [`Lookup::ForUpdate`] the code row stays locked until `tx` ends, and the
    /// redemption count is read after the lock is held.
    pub(crate) async fn evaluate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        user: UserUuid,
        total: u64,
        now: Timestamp,
        lookup: Lookup,
    ) -> Result<Option<Evaluation>, sqlx::Error> {
        let Some(record) = self.discounts.find_active_code(tx, code, lookup).await? else {
            return Ok(None);
        };

        let usage_count = self.discounts.count_usages(tx, record.uuid).await?;

        let used_by_user = if record.rules.single_use_per_user {
            self.discounts.used_by_user(tx, record.uuid, user).await?
        } else {
            false
        };

        let verdict = evaluate(
            &record.rules,
            &RedemptionContext {
                total,
                now,
                usage_count,
                used_by_user,
            },
        );

        Ok(Some(Evaluation {
            code: record,
            usage_count,
            verdict,
        }))
    }
}
