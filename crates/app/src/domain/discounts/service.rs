//! Discounts Service

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use storefront_core::discounts::DiscountRejection;
use tracing::{Span, info};

use crate::{
    database::Db,
    domain::{
        discounts::{
            DiscountsServiceError,
            data::{DiscountCodeUpdate, NewDiscountCode},
            evaluator::DiscountEvaluator,
            models::DiscountPreview,
            records::{DiscountCodeRecord, DiscountCodeUuid},
            repository::{Lookup, PgDiscountsRepository},
        },
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgDiscountsService {
    db: Db,
    discounts: PgDiscountsRepository,
    evaluator: DiscountEvaluator,
}

impl PgDiscountsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            discounts: PgDiscountsRepository::new(),
            evaluator: DiscountEvaluator::new(),
        }
    }
}

#[async_trait]
impl DiscountsService for PgDiscountsService {
    #[tracing::instrument(
        name = "discounts.service.apply_discount",
        skip(self, code),
        fields(user_uuid = %user, discount_code_uuid = tracing::field::Empty),
        err
    )]
    async fn apply_discount(
        &self,
        user: UserUuid,
        code: String,
        total: u64,
        now: Timestamp,
    ) -> Result<DiscountPreview, DiscountsServiceError> {
        let code = code.trim();

        if code.is_empty() {
            return Err(DiscountRejection::CodeNotFound.into());
        }

        let mut tx = self.db.begin_transaction().await?;

        let evaluation = self
            .evaluator
            .evaluate(&mut tx, code, user, total, now, Lookup::Read)
            .await?
            .ok_or(DiscountRejection::CodeNotFound)?;

        Span::current().record(
            "discount_code_uuid",
            tracing::field::display(evaluation.code.uuid),
        );

        let exhausted = evaluation.is_exhausted();

        match evaluation.verdict {
            Ok(applied) => {
                tx.commit().await?;

                Ok(DiscountPreview {
                    discount_code: evaluation.code.uuid,
                    code: evaluation.code.code,
                    applied,
                })
            }
            Err(rejection) => {
                if exhausted
                    && self
                        .discounts
                        .deactivate_code(&mut tx, evaluation.code.uuid)
                        .await?
                {
                    info!(
                        discount_code_uuid = %evaluation.code.uuid,
                        usage_count = evaluation.usage_count,
                        "deactivated exhausted discount code"
                    );
                }

                tx.commit().await?;

                Err(rejection.into())
            }
        }
    }

    async fn list_discount_codes(&self) -> Result<Vec<DiscountCodeRecord>, DiscountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let codes = self.discounts.list_codes(&mut tx).await?;

        tx.commit().await?;

        Ok(codes)
    }

    async fn get_discount_code(
        &self,
        code: DiscountCodeUuid,
    ) -> Result<DiscountCodeRecord, DiscountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.discounts.get_code(&mut tx, code).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "discounts.service.create_discount_code",
        skip(self, code),
        fields(discount_code_uuid = %code.uuid, kind = code.rules.kind.to_str()),
        err
    )]
    async fn create_discount_code(
        &self,
        code: NewDiscountCode,
    ) -> Result<DiscountCodeRecord, DiscountsServiceError> {
        if code.code.trim().is_empty() {
            return Err(DiscountsServiceError::MissingRequiredData);
        }

        code.rules.kind.validate()?;

        if !code.amounts_fit() {
            return Err(DiscountsServiceError::InvalidData);
        }

        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .discounts
            .create_code(
                &mut tx,
                &NewDiscountCode {
                    code: code.code.trim().to_string(),
                    ..code
                },
            )
            .await?;

        tx.commit().await?;

        info!(discount_code_uuid = %record.uuid, "created discount code");

        Ok(record)
    }

    #[tracing::instrument(
        name = "discounts.service.update_discount_code",
        skip(self, update),
        fields(discount_code_uuid = %code, cleared_usages = tracing::field::Empty),
        err
    )]
    async fn update_discount_code(
        &self,
        code: DiscountCodeUuid,
        update: DiscountCodeUpdate,
    ) -> Result<DiscountCodeRecord, DiscountsServiceError> {
        if update.is_empty() {
            return Err(DiscountsServiceError::EmptyUpdate);
        }

        if update
            .code
            .as_deref()
            .is_some_and(|value| value.trim().is_empty())
        {
            return Err(DiscountsServiceError::MissingRequiredData);
        }

        if let Some(kind) = &update.kind {
            kind.validate()?;
        }

        if !update.amounts_fit() {
            return Err(DiscountsServiceError::InvalidData);
        }

        let update = DiscountCodeUpdate {
            code: update.code.map(|value| value.trim().to_string()),
            ..update
        };

        let mut tx = self.db.begin_transaction().await?;

        let existing = self.discounts.lock_code(&mut tx, code).await?;

        if update.reactivates(existing.active) {
            let cleared = self.discounts.clear_usages(&mut tx, code).await?;

            Span::current().record("cleared_usages", cleared);
        }

        let record = self
            .discounts
            .update_code(&mut tx, code, &update)
            .await?
            .ok_or(DiscountsServiceError::NotFound)?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "discounts.service.delete_discount_code",
        skip(self),
        fields(discount_code_uuid = %code),
        err
    )]
    async fn delete_discount_code(&self, code: DiscountCodeUuid) -> Result<(), DiscountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let detached = self.discounts.detach_purchases(&mut tx, code).await?;
        let cleared = self.discounts.clear_usages(&mut tx, code).await?;

        let rows_affected = self.discounts.delete_code(&mut tx, code).await?;

        if rows_affected == 0 {
            return Err(DiscountsServiceError::NotFound);
        }

        tx.commit().await?;

        info!(detached, cleared, "deleted discount code");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait DiscountsService: Send + Sync {
    /// Check whether `code` would apply to an order of `total` without redeeming
    /// it. A code found exhausted is deactivated on the way out.
    async fn apply_discount(
        &self,
        user: UserUuid,
        code: String,
        total: u64,
        now: Timestamp,
    ) -> Result<DiscountPreview, DiscountsServiceError>;

    /// All discount codes, newest first.
    async fn list_discount_codes(&self) -> Result<Vec<DiscountCodeRecord>, DiscountsServiceError>;

    async fn get_discount_code(
        &self,
        code: DiscountCodeUuid,
    ) -> Result<DiscountCodeRecord, DiscountsServiceError>;

    async fn create_discount_code(
        &self,
        code: NewDiscountCode,
    ) -> Result<DiscountCodeRecord, DiscountsServiceError>;

    /// Apply a partial update. Reactivating an inactive code clears its
    /// redemption history.
    async fn update_discount_code(
        &self,
        code: DiscountCodeUuid,
        update: DiscountCodeUpdate,
    ) -> Result<DiscountCodeRecord, DiscountsServiceError>;

    /// Delete a code, detaching it from past purchases.
    async fn delete_discount_code(&self, code: DiscountCodeUuid) -> Result<(), DiscountsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use rust_decimal::Decimal;
    use storefront_core::discounts::{DiscountKind, DiscountRules};
    use testresult::TestResult;

    use crate::{
        domain::{checkout::CheckoutService, users::UsersService},
        test::{TestContext, helpers::percent_rules},
    };

    use super::*;

    #[tokio::test]
    async fn preview_applies_percentage() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("preview@example.com").await?;

        ctx.create_discount("SAVE10", percent_rules(10)).await?;

        let preview = ctx
            .discounts
            .apply_discount(user, " SAVE10 ".to_string(), 100_00, Timestamp::now())
            .await?;

        assert_eq!(preview.code, "SAVE10");
        assert_eq!(preview.applied.discount_amount, 10_00);
        assert_eq!(preview.applied.final_amount, 90_00);

        Ok(())
    }

    #[tokio::test]
    async fn preview_unknown_code_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("unknown-code@example.com").await?;

        let result = ctx
            .discounts
            .apply_discount(user, "NOPE".to_string(), 100_00, Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(DiscountsServiceError::Rejected(DiscountRejection::CodeNotFound))
            ),
            "expected CodeNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn preview_inactive_code_is_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("inactive@example.com").await?;

        ctx.discounts
            .create_discount_code(NewDiscountCode {
                uuid: DiscountCodeUuid::new(),
                code: "DORMANT".to_string(),
                rules: percent_rules(10),
                active: false,
            })
            .await?;

        let result = ctx
            .discounts
            .apply_discount(user, "DORMANT".to_string(), 100_00, Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(DiscountsServiceError::Rejected(DiscountRejection::CodeNotFound))
            ),
            "expected CodeNotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn preview_expired_code_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("expired@example.com").await?;
        let now = Timestamp::now();

        ctx.create_discount(
            "YESTERDAY",
            DiscountRules {
                ends_at: Some(now - SignedDuration::from_hours(24)),
                ..percent_rules(10)
            },
        )
        .await?;

        let result = ctx
            .discounts
            .apply_discount(user, "YESTERDAY".to_string(), 100_00, now)
            .await;

        assert!(
            matches!(
                result,
                Err(DiscountsServiceError::Rejected(DiscountRejection::Expired { .. }))
            ),
            "expected Expired, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn preview_below_minimum_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("minimum@example.com").await?;

        ctx.create_discount(
            "BIGSPEND",
            DiscountRules {
                min_total: 50_00,
                ..percent_rules(10)
            },
        )
        .await?;

        let result = ctx
            .discounts
            .apply_discount(user, "BIGSPEND".to_string(), 49_99, Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(DiscountsServiceError::Rejected(
                    DiscountRejection::BelowMinimum {
                        minimum: 50_00,
                        total: 49_99
                    }
                ))
            ),
            "expected BelowMinimum, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn preview_of_exhausted_code_deactivates_it() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("late@example.com").await?;

        let code = ctx
            .create_discount(
                "LIMITED",
                DiscountRules {
                    usage_limit: Some(2),
                    ..percent_rules(10)
                },
            )
            .await?;

        ctx.redeem(code.uuid, 2).await?;

        let result = ctx
            .discounts
            .apply_discount(user, "LIMITED".to_string(), 100_00, Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(DiscountsServiceError::Rejected(
                    DiscountRejection::UsageLimitReached { limit: 2, used: 2 }
                ))
            ),
            "expected UsageLimitReached, got {result:?}"
        );

        let code = ctx.discounts.get_discount_code(code.uuid).await?;

        assert!(!code.active);

        Ok(())
    }

    #[tokio::test]
    async fn single_use_code_rejects_second_redemption() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("once@example.com").await?;
        let game = ctx.create_game("Once", 20_00).await?;

        ctx.create_discount(
            "ONCE",
            DiscountRules {
                single_use_per_user: true,
                ..percent_rules(10)
            },
        )
        .await?;

        ctx.users.deposit(user, 20_00).await?;
        ctx.fill_cart(user, &[game]).await?;
        ctx.checkout
            .checkout(user, Some("ONCE".to_string()), Timestamp::now())
            .await?;

        let result = ctx
            .discounts
            .apply_discount(user, "ONCE".to_string(), 20_00, Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(DiscountsServiceError::Rejected(DiscountRejection::AlreadyUsed))
            ),
            "expected AlreadyUsed, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_percentage() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .create_discount(
                "TOOMUCH",
                DiscountRules {
                    kind: DiscountKind::Percent {
                        percentage: Decimal::from(101),
                    },
                    ..percent_rules(10)
                },
            )
            .await;

        assert!(
            matches!(result, Err(DiscountsServiceError::InvalidDiscount(_))),
            "expected InvalidDiscount, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_minimum_beyond_bigint() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx
            .create_discount(
                "HUGEMIN",
                DiscountRules {
                    min_total: u64::MAX,
                    ..percent_rules(10)
                },
            )
            .await;

        assert!(
            matches!(result, Err(DiscountsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_rejects_usage_limit_beyond_bigint() -> TestResult {
        let ctx = TestContext::new().await;
        let code = ctx.create_discount("HUGELIMIT", percent_rules(10)).await?;

        let result = ctx
            .discounts
            .update_discount_code(
                code.uuid,
                DiscountCodeUpdate {
                    usage_limit: Some(Some(u64::MAX)),
                    ..DiscountCodeUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(DiscountsServiceError::InvalidData)),
            "expected InvalidData, got {result:?}"
        );

        let unchanged = ctx.discounts.get_discount_code(code.uuid).await?;

        assert_eq!(unchanged.rules.usage_limit, None);

        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_blank_code() -> TestResult {
        let ctx = TestContext::new().await;

        let result = ctx.create_discount("   ", percent_rules(10)).await;

        assert!(
            matches!(result, Err(DiscountsServiceError::MissingRequiredData)),
            "expected MissingRequiredData, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.create_discount("TWICE", percent_rules(10)).await?;

        let result = ctx.create_discount("TWICE", percent_rules(20)).await;

        assert!(
            matches!(result, Err(DiscountsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn fixed_code_round_trips_through_storage() -> TestResult {
        let ctx = TestContext::new().await;

        let created = ctx
            .create_discount(
                "FIVEOFF",
                DiscountRules {
                    kind: DiscountKind::Fixed { amount: 5_00 },
                    ..percent_rules(10)
                },
            )
            .await?;

        let fetched = ctx.discounts.get_discount_code(created.uuid).await?;

        assert_eq!(fetched.rules.kind, DiscountKind::Fixed { amount: 5_00 });
        assert_eq!(fetched, created);

        Ok(())
    }

    #[tokio::test]
    async fn empty_update_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let code = ctx.create_discount("STATIC", percent_rules(10)).await?;

        let result = ctx
            .discounts
            .update_discount_code(code.uuid, DiscountCodeUpdate::default())
            .await;

        assert!(
            matches!(result, Err(DiscountsServiceError::EmptyUpdate)),
            "expected EmptyUpdate, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() -> TestResult {
        let ctx = TestContext::new().await;
        let code = ctx.create_discount("PATCHME", percent_rules(10)).await?;

        let updated = ctx
            .discounts
            .update_discount_code(
                code.uuid,
                DiscountCodeUpdate {
                    kind: Some(DiscountKind::Fixed { amount: 3_00 }),
                    usage_limit: Some(Some(10)),
                    ..DiscountCodeUpdate::default()
                },
            )
            .await?;

        assert_eq!(updated.code, "PATCHME");
        assert_eq!(updated.rules.kind, DiscountKind::Fixed { amount: 3_00 });
        assert_eq!(updated.rules.usage_limit, Some(10));
        assert!(updated.active);

        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_code_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .discounts
            .update_discount_code(
                DiscountCodeUuid::new(),
                DiscountCodeUpdate {
                    active: Some(false),
                    ..DiscountCodeUpdate::default()
                },
            )
            .await;

        assert!(
            matches!(result, Err(DiscountsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn reactivation_clears_usage_history() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("again@example.com").await?;

        let code = ctx
            .create_discount(
                "COMEBACK",
                DiscountRules {
                    usage_limit: Some(1),
                    ..percent_rules(10)
                },
            )
            .await?;

        ctx.redeem(code.uuid, 1).await?;

        ctx.discounts
            .update_discount_code(
                code.uuid,
                DiscountCodeUpdate {
                    active: Some(false),
                    ..DiscountCodeUpdate::default()
                },
            )
            .await?;

        ctx.discounts
            .update_discount_code(
                code.uuid,
                DiscountCodeUpdate {
                    active: Some(true),
                    ..DiscountCodeUpdate::default()
                },
            )
            .await?;

        let preview = ctx
            .discounts
            .apply_discount(user, "COMEBACK".to_string(), 100_00, Timestamp::now())
            .await?;

        assert_eq!(preview.applied.final_amount, 90_00);

        Ok(())
    }

    #[tokio::test]
    async fn updating_an_active_code_keeps_usage_history() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("history@example.com").await?;

        let code = ctx
            .create_discount(
                "KEEP",
                DiscountRules {
                    usage_limit: Some(1),
                    ..percent_rules(10)
                },
            )
            .await?;

        ctx.redeem(code.uuid, 1).await?;

        ctx.discounts
            .update_discount_code(
                code.uuid,
                DiscountCodeUpdate {
                    active: Some(true),
                    ..DiscountCodeUpdate::default()
                },
            )
            .await?;

        let result = ctx
            .discounts
            .apply_discount(user, "KEEP".to_string(), 100_00, Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(DiscountsServiceError::Rejected(
                    DiscountRejection::UsageLimitReached { .. }
                ))
            ),
            "expected UsageLimitReached, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_detaches_past_purchases() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("history-buyer@example.com").await?;
        let game = ctx.create_game("Detached", 40_00).await?;

        let code = ctx.create_discount("GONE", percent_rules(25)).await?;

        ctx.users.deposit(user, 40_00).await?;
        ctx.fill_cart(user, &[game]).await?;

        let receipt = ctx
            .checkout
            .checkout(user, Some("GONE".to_string()), Timestamp::now())
            .await?;

        assert_eq!(receipt.purchase.discount_code, Some(code.uuid));

        ctx.discounts.delete_discount_code(code.uuid).await?;

        let purchases = ctx.checkout.list_purchases(user).await?;

        assert_eq!(purchases.len(), 1);
        assert_eq!(purchases.first().map(|p| p.discount_code), Some(None));
        assert_eq!(purchases.first().map(|p| p.discount_amount), Some(10_00));

        let result = ctx.discounts.get_discount_code(code.uuid).await;

        assert!(
            matches!(result, Err(DiscountsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_unknown_code_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .discounts
            .delete_discount_code(DiscountCodeUuid::new())
            .await;

        assert!(
            matches!(result, Err(DiscountsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }
}
