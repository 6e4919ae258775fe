//! Discount Deactivation Sweeper
//!
//! Flips active codes inactive once they are exhausted or past their end date.
//! The scan reads candidates in one transaction and then deactivates each code in
//! its own short transaction with a conditional update, so a failure on one code
//! never aborts the rest of the scan.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::discounts::{DiscountsServiceError, repository::PgDiscountsRepository},
};

/// Outcome of a single sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Active codes with a usage limit or an end date.
    pub examined: u64,

    /// Codes this sweep turned inactive.
    pub deactivated: u64,

    /// Codes whose deactivation failed.
    pub failed: u64,
}

#[derive(Debug, Clone)]
pub struct PgDiscountSweeper {
    db: Db,
    discounts: PgDiscountsRepository,
}

impl PgDiscountSweeper {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            discounts: PgDiscountsRepository::new(),
        }
    }
}

#[async_trait]
impl DiscountSweeper for PgDiscountSweeper {
    #[tracing::instrument(name = "discounts.sweeper.sweep_once", skip(self), err)]
    async fn sweep_once(&self, now: Timestamp) -> Result<SweepReport, DiscountsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let candidates = self.discounts.list_sweep_candidates(&mut tx).await?;

        tx.commit().await?;

        let mut report = SweepReport {
            examined: u64::try_from(candidates.len()).unwrap_or(u64::MAX),
            ..SweepReport::default()
        };

        for candidate in candidates.iter().filter(|candidate| candidate.is_stale(now)) {
            let result = async {
                let mut tx = self.db.begin_transaction().await?;

                let changed = self
                    .discounts
                    .deactivate_stale_code(&mut tx, candidate.uuid, now)
                    .await?;

                tx.commit().await?;

                Ok::<_, sqlx::Error>(changed)
            }
            .await;

            match result {
                Ok(true) => {
                    report.deactivated += 1;

                    info!(
                        discount_code_uuid = %candidate.uuid,
                        code = %candidate.code,
                        usage_count = candidate.usage_count,
                        "deactivated discount code"
                    );
                }
                // reactivated or already deactivated since the scan
                Ok(false) => {}
                Err(error) => {
                    report.failed += 1;

                    warn!(
                        discount_code_uuid = %candidate.uuid,
                        error = %error,
                        "failed to deactivate discount code"
                    );
                }
            }
        }

        Ok(report)
    }
}

#[automock]
#[async_trait]
pub trait DiscountSweeper: Send + Sync {
    /// Deactivate every active code that is exhausted or expired at `now`.
    async fn sweep_once(&self, now: Timestamp) -> Result<SweepReport, DiscountsServiceError>;
}
