//! Checkout Service
//!
//! Locks are always taken in the same order: the buyer's user row, then the
//! discount code row, then the ranking advisory lock.

use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rustc_hash::FxHashMap;
use storefront_core::{
    checkout::{
        CheckoutProgress, CheckoutRejection, CheckoutStage, IllegalTransition, ensure_not_owned,
        load_total, settle, verify_funds,
    },
    discounts::AppliedDiscount,
};
use tracing::{Span, debug, info, warn};
use uuid::Uuid;

use crate::{
    database::{DEFAULT_LOCK_TIMEOUT, Db},
    domain::{
        amounts::display_amount,
        carts::{loader::CartLoader, repositories::PgCartItemsRepository},
        checkout::{
            CheckoutServiceError,
            models::{CheckoutReceipt, Purchase},
            records::{PurchaseItemRecord, PurchaseUuid},
            repositories::PgPurchasesRepository,
        },
        discounts::{
            evaluator::DiscountEvaluator,
            records::{DiscountCodeRecord, DiscountCodeUuid},
            repository::{Lookup, PgDiscountsRepository},
        },
        games::repositories::PgRankingRepository,
        users::{
            records::{UserUuid, WalletTransactionKind},
            repository::PgUsersRepository,
        },
    },
};

/// A discount that passed every rule and will be redeemed.
#[derive(Debug)]
struct RedeemedDiscount {
    code: DiscountCodeRecord,
    applied: AppliedDiscount,
    usage_count: u64,
}

#[derive(Debug, Clone)]
pub struct PgCheckoutService {
    db: Db,
    lock_timeout: Duration,
    users: PgUsersRepository,
    loader: CartLoader,
    items: PgCartItemsRepository,
    purchases: PgPurchasesRepository,
    ranking: PgRankingRepository,
    discounts: PgDiscountsRepository,
    evaluator: DiscountEvaluator,
}

impl PgCheckoutService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            users: PgUsersRepository::new(),
            loader: CartLoader::new(),
            items: PgCartItemsRepository::new(),
            purchases: PgPurchasesRepository::new(),
            ranking: PgRankingRepository::new(),
            discounts: PgDiscountsRepository::new(),
            evaluator: DiscountEvaluator::new(),
        }
    }

    /// How long a checkout waits on a row lock before giving up.
    #[must_use]
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Deactivate a code found exhausted, outside the (rolled back) checkout.
    async fn deactivate_exhausted(&self, code: DiscountCodeUuid) {
        let result = async {
            let mut tx = self.db.begin_transaction().await?;

            let changed = self.discounts.deactivate_code(&mut tx, code).await?;

            tx.commit().await?;

            Ok::<_, sqlx::Error>(changed)
        }
        .await;

        match result {
            Ok(true) => info!(discount_code_uuid = %code, "deactivated exhausted discount code"),
            Ok(false) => {}
            Err(error) => warn!(
                discount_code_uuid = %code,
                error = %error,
                "failed to deactivate exhausted discount code"
            ),
        }
    }
}

fn advance(progress: &mut CheckoutProgress, to: CheckoutStage) -> Result<(), IllegalTransition> {
    progress.advance(to)?;

    Span::current().record("checkout.stage", to.as_str());

    Ok(())
}

#[async_trait]
impl CheckoutService for PgCheckoutService {
    #[tracing::instrument(
        name = "checkout.service.checkout",
        skip(self, discount_code),
        fields(
            user_uuid = %user,
            checkout.stage = CheckoutStage::Begin.as_str(),
            discount_code_uuid = tracing::field::Empty,
            purchase_uuid = tracing::field::Empty,
        ),
        err
    )]
    async fn checkout(
        &self,
        user: UserUuid,
        discount_code: Option<String>,
        now: Timestamp,
    ) -> Result<CheckoutReceipt, CheckoutServiceError> {
        let discount_code = discount_code
            .map(|code| code.trim().to_string())
            .filter(|code| !code.is_empty());

        let mut progress = CheckoutProgress::new();

        let mut tx = self.db.begin_locking_transaction(self.lock_timeout).await?;

        let buyer = self.users.lock_user(&mut tx, user).await?;

        let cart = self.loader.load(&mut tx, user).await?;
        let total = load_total(&cart.lines)?;

        advance(&mut progress, CheckoutStage::CartLoaded)?;

        let games: Vec<Uuid> = cart.lines.iter().map(|line| line.game).collect();
        let owned = self.purchases.owned_games(&mut tx, user, &games).await?;

        ensure_not_owned(&cart.lines, &owned)?;

        advance(&mut progress, CheckoutStage::OwnershipChecked)?;

        let mut discount = None;

        if let Some(code) = discount_code.as_deref() {
            match self
                .evaluator
                .evaluate(&mut tx, code, user, total, now, Lookup::ForUpdate)
                .await?
            {
                None => debug!("discount code not found, continuing without discount"),
                Some(evaluation) => {
                    Span::current().record(
                        "discount_code_uuid",
                        tracing::field::display(evaluation.code.uuid),
                    );

                    let exhausted = evaluation.is_exhausted();

                    match evaluation.verdict {
                        Ok(applied) => {
                            discount = Some(RedeemedDiscount {
                                code: evaluation.code,
                                applied,
                                usage_count: evaluation.usage_count,
                            });
                        }
                        Err(rejection) => {
                            if exhausted {
                                tx.rollback().await?;

                                self.deactivate_exhausted(evaluation.code.uuid).await;
                            }

                            return Err(CheckoutRejection::from(rejection).into());
                        }
                    }
                }
            }
        }

        let settlement = settle(
            &cart.lines,
            total,
            discount.as_ref().map(|redeemed| &redeemed.applied),
        );

        advance(&mut progress, CheckoutStage::DiscountResolved)?;

        verify_funds(buyer.wallet_balance, settlement.final_amount)?;

        advance(&mut progress, CheckoutStage::FundsVerified)?;

        let purchase = self
            .purchases
            .create_purchase(
                &mut tx,
                PurchaseUuid::new(),
                user,
                &settlement,
                discount.as_ref().map(|redeemed| redeemed.code.uuid),
            )
            .await?;

        Span::current().record("purchase_uuid", tracing::field::display(purchase.uuid));

        let items = self
            .purchases
            .create_items(&mut tx, purchase.uuid, &cart.lines)
            .await?;

        self.purchases
            .mark_owned(&mut tx, user, purchase.uuid, &games)
            .await?;

        let sales: Vec<(Uuid, u64)> = cart
            .lines
            .iter()
            .map(|line| (line.game, u64::from(line.quantity)))
            .collect();

        self.ranking.lock(&mut tx).await?;
        self.ranking.increment_sales(&mut tx, &sales).await?;
        self.ranking.recompute_rank_positions(&mut tx).await?;

        if let Some(redeemed) = &discount {
            self.discounts
                .create_usage(&mut tx, redeemed.code.uuid, user)
                .await?;

            if redeemed
                .code
                .rules
                .is_exhausted(redeemed.usage_count.saturating_add(1))
            {
                self.discounts
                    .deactivate_code(&mut tx, redeemed.code.uuid)
                    .await?;

                info!(
                    discount_code_uuid = %redeemed.code.uuid,
                    "discount code reached its usage limit"
                );
            }
        }

        let balance = self
            .users
            .debit_wallet(&mut tx, user, settlement.final_amount)
            .await?
            .ok_or(CheckoutRejection::InsufficientFunds {
                balance: buyer.wallet_balance,
                required: settlement.final_amount,
            })?;

        let games_count = u64::try_from(cart.lines.len()).unwrap_or(u64::MAX);

        self.users
            .create_wallet_transaction(
                &mut tx,
                user,
                WalletTransactionKind::Purchase,
                settlement.final_amount,
                &format!(
                    "Purchase of {games_count} game(s) for {}",
                    display_amount(settlement.final_amount)
                ),
            )
            .await?;

        self.items.clear_cart_items(&mut tx, cart.uuid).await?;

        tx.commit().await?;

        advance(&mut progress, CheckoutStage::Committed)?;

        info!(
            purchase_uuid = %purchase.uuid,
            total = settlement.total,
            discount_amount = settlement.discount_amount,
            final_amount = settlement.final_amount,
            "checkout committed"
        );

        Ok(CheckoutReceipt {
            purchase,
            items,
            discount_code: discount.map(|redeemed| redeemed.code.code),
            games_count,
            items_count: settlement.items_count,
            balance,
        })
    }

    async fn list_purchases(&self, user: UserUuid) -> Result<Vec<Purchase>, CheckoutServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let records = self.purchases.list_purchases(&mut tx, user).await?;

        let uuids: Vec<Uuid> = records.iter().map(|record| record.uuid.into_uuid()).collect();

        let mut items: FxHashMap<PurchaseUuid, Vec<PurchaseItemRecord>> = FxHashMap::default();

        for item in self.purchases.list_items(&mut tx, &uuids).await? {
            items.entry(item.purchase).or_default().push(item);
        }

        tx.commit().await?;

        Ok(records
            .into_iter()
            .map(|record| {
                let purchase_items = items.remove(&record.uuid).unwrap_or_default();

                Purchase::from_parts(record, purchase_items)
            })
            .collect())
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Buy everything in the user's cart, optionally redeeming a discount code.
    ///
    /// Either every write lands or none does. An unknown or inactive code is
    /// ignored; any other ineligible code rejects the checkout.
    async fn checkout(
        &self,
        user: UserUuid,
        discount_code: Option<String>,
        now: Timestamp,
    ) -> Result<CheckoutReceipt, CheckoutServiceError>;

    /// The user's purchases, newest first.
    async fn list_purchases(&self, user: UserUuid) -> Result<Vec<Purchase>, CheckoutServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use storefront_core::discounts::{DiscountRejection, DiscountRules};
    use testresult::TestResult;

    use crate::{
        domain::{
            carts::{CartsService, data::NewCartItem},
            discounts::{DiscountsService, DiscountsServiceError},
            games::{GamesService, records::GameUuid},
            users::UsersService,
        },
        test::{
            TestContext,
            helpers::{fixed_rules, percent_rules},
        },
    };

    use super::*;

    #[tokio::test]
    async fn discounted_checkout_exhausts_code() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("buyer@example.com").await?;
        let game = ctx.create_game("Hollow Knight", 100_00).await?;

        let code = ctx
            .create_discount(
                "SAVE10",
                DiscountRules {
                    usage_limit: Some(5),
                    ..percent_rules(10)
                },
            )
            .await?;

        ctx.redeem(code.uuid, 4).await?;
        ctx.users.deposit(user, 100_00).await?;
        ctx.fill_cart(user, &[game]).await?;

        let receipt = ctx
            .checkout
            .checkout(user, Some("SAVE10".to_string()), Timestamp::now())
            .await?;

        assert_eq!(receipt.purchase.total, 100_00);
        assert_eq!(receipt.purchase.discount_amount, 10_00);
        assert_eq!(receipt.purchase.final_amount, 90_00);
        assert_eq!(receipt.purchase.discount_code, Some(code.uuid));
        assert_eq!(receipt.discount_code.as_deref(), Some("SAVE10"));
        assert_eq!(receipt.games_count, 1);
        assert_eq!(receipt.balance, 10_00);

        let code = ctx.discounts.get_discount_code(code.uuid).await?;

        assert!(!code.active, "code should be inactive after its last redemption");

        let wallet = ctx.users.get_wallet(user).await?;
        let purchase_entry = wallet
            .transactions
            .iter()
            .find(|entry| entry.kind == WalletTransactionKind::Purchase);

        assert_eq!(wallet.balance, 10_00);
        assert_eq!(
            purchase_entry.map(|entry| entry.description.as_str()),
            Some("Purchase of 1 game(s) for $90.00")
        );
        assert_eq!(purchase_entry.map(|entry| entry.amount), Some(90_00));

        assert!(ctx.carts.get_cart(user).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn insufficient_funds_writes_nothing() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("short@example.com").await?;
        let game = ctx.create_game("Expensive", 80_00).await?;

        ctx.users.deposit(user, 50_00).await?;
        ctx.fill_cart(user, &[game]).await?;

        let result = ctx.checkout.checkout(user, None, Timestamp::now()).await;

        assert!(
            matches!(
                result,
                Err(CheckoutServiceError::Rejected(
                    CheckoutRejection::InsufficientFunds {
                        balance: 50_00,
                        required: 80_00
                    }
                ))
            ),
            "expected InsufficientFunds, got {result:?}"
        );

        assert!(ctx.checkout.list_purchases(user).await?.is_empty());

        let wallet = ctx.users.get_wallet(user).await?;

        assert_eq!(wallet.balance, 50_00);
        assert_eq!(wallet.transactions.len(), 1);

        let ranking = ctx.games.list_rankings().await?;

        assert_eq!(ranking.first().map(|r| r.sales_count), Some(0));
        assert_eq!(ctx.carts.get_cart(user).await?.lines.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn expired_code_rejects_checkout() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("late-buyer@example.com").await?;
        let game = ctx.create_game("Celeste", 20_00).await?;
        let now = Timestamp::now();

        ctx.create_discount(
            "YESTERDAY",
            DiscountRules {
                ends_at: Some(now - SignedDuration::from_hours(24)),
                ..percent_rules(10)
            },
        )
        .await?;

        ctx.users.deposit(user, 20_00).await?;
        ctx.fill_cart(user, &[game]).await?;

        let result = ctx
            .checkout
            .checkout(user, Some("YESTERDAY".to_string()), now)
            .await;

        assert!(
            matches!(
                result,
                Err(CheckoutServiceError::Rejected(CheckoutRejection::Discount(
                    DiscountRejection::Expired { .. }
                )))
            ),
            "expected Expired, got {result:?}"
        );

        assert_eq!(ctx.users.get_wallet(user).await?.balance, 20_00);
        assert_eq!(ctx.carts.get_cart(user).await?.lines.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn owned_game_in_cart_rolls_back_everything() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("collector@example.com").await?;
        let owned = ctx.create_game("Owned", 10_00).await?;
        let wanted = ctx.create_game("Wanted", 15_00).await?;

        ctx.users.deposit(user, 100_00).await?;
        ctx.fill_cart(user, &[owned]).await?;
        ctx.checkout.checkout(user, None, Timestamp::now()).await?;

        ctx.fill_cart(user, &[wanted, owned]).await?;

        let result = ctx.checkout.checkout(user, None, Timestamp::now()).await;

        assert!(
            matches!(
                &result,
                Err(CheckoutServiceError::Rejected(CheckoutRejection::AlreadyOwned { game }))
                    if *game == owned.into_uuid()
            ),
            "expected AlreadyOwned, got {result:?}"
        );

        assert_eq!(ctx.checkout.list_purchases(user).await?.len(), 1);
        assert_eq!(ctx.users.get_wallet(user).await?.balance, 90_00);

        let ranking = ctx.games.list_rankings().await?;
        let wanted_sales = ranking
            .iter()
            .find(|row| row.game == wanted)
            .map(|row| row.sales_count);

        assert_eq!(wanted_sales, Some(0));
        assert_eq!(ctx.carts.get_cart(user).await?.lines.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("nothing@example.com").await?;

        let result = ctx.checkout.checkout(user, None, Timestamp::now()).await;

        assert!(
            matches!(
                result,
                Err(CheckoutServiceError::Rejected(CheckoutRejection::EmptyCart))
            ),
            "expected EmptyCart, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn unknown_user_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx
            .checkout
            .checkout(UserUuid::new(), None, Timestamp::now())
            .await;

        assert!(
            matches!(result, Err(CheckoutServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn unknown_code_checks_out_at_full_price() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("hopeful@example.com").await?;
        let game = ctx.create_game("Full Price", 30_00).await?;

        ctx.users.deposit(user, 30_00).await?;
        ctx.fill_cart(user, &[game]).await?;

        let receipt = ctx
            .checkout
            .checkout(user, Some("MADEUP".to_string()), Timestamp::now())
            .await?;

        assert_eq!(receipt.purchase.final_amount, 30_00);
        assert_eq!(receipt.purchase.discount_code, None);
        assert_eq!(receipt.discount_code, None);

        Ok(())
    }

    #[tokio::test]
    async fn blank_code_is_treated_as_no_code() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("blank@example.com").await?;
        let game = ctx.create_game("Blank", 30_00).await?;

        ctx.users.deposit(user, 30_00).await?;
        ctx.fill_cart(user, &[game]).await?;

        let receipt = ctx
            .checkout
            .checkout(user, Some("   ".to_string()), Timestamp::now())
            .await?;

        assert_eq!(receipt.purchase.discount_amount, 0);

        Ok(())
    }

    #[tokio::test]
    async fn exhausted_code_rejects_and_is_deactivated() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("too-late@example.com").await?;
        let game = ctx.create_game("Sold Out Deal", 30_00).await?;

        let code = ctx
            .create_discount(
                "GONEFAST",
                DiscountRules {
                    usage_limit: Some(1),
                    ..percent_rules(50)
                },
            )
            .await?;

        ctx.redeem(code.uuid, 1).await?;
        ctx.users.deposit(user, 30_00).await?;
        ctx.fill_cart(user, &[game]).await?;

        let result = ctx
            .checkout
            .checkout(user, Some("GONEFAST".to_string()), Timestamp::now())
            .await;

        assert!(
            matches!(
                result,
                Err(CheckoutServiceError::Rejected(CheckoutRejection::Discount(
                    DiscountRejection::UsageLimitReached { limit: 1, used: 1 }
                )))
            ),
            "expected UsageLimitReached, got {result:?}"
        );

        assert!(!ctx.discounts.get_discount_code(code.uuid).await?.active);
        assert_eq!(ctx.users.get_wallet(user).await?.balance, 30_00);

        let preview = ctx
            .discounts
            .apply_discount(user, "GONEFAST".to_string(), 30_00, Timestamp::now())
            .await;

        assert!(
            matches!(
                preview,
                Err(DiscountsServiceError::Rejected(DiscountRejection::CodeNotFound))
            ),
            "expected CodeNotFound, got {preview:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn fixed_discount_covering_total_needs_no_funds() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("free@example.com").await?;
        let game = ctx.create_game("Gift", 20_00).await?;

        ctx.create_discount("GIFTCARD", fixed_rules(50_00)).await?;

        ctx.fill_cart(user, &[game]).await?;

        let receipt = ctx
            .checkout
            .checkout(user, Some("GIFTCARD".to_string()), Timestamp::now())
            .await?;

        assert_eq!(receipt.purchase.discount_amount, 20_00);
        assert_eq!(receipt.purchase.final_amount, 0);
        assert_eq!(receipt.balance, 0);

        Ok(())
    }

    #[tokio::test]
    async fn purchase_history_keeps_price_at_purchase() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("history@example.com").await?;
        let first = ctx.create_game("First", 12_00).await?;
        let second = ctx.create_game("Second", 8_00).await?;

        ctx.users.deposit(user, 20_00).await?;
        ctx.fill_cart(user, &[first, second]).await?;

        let receipt = ctx.checkout.checkout(user, None, Timestamp::now()).await?;

        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.items_count, 2);

        let purchases = ctx.checkout.list_purchases(user).await?;
        let purchase = purchases.first();

        assert_eq!(purchases.len(), 1);
        assert_eq!(purchase.map(|p| p.uuid), Some(receipt.purchase.uuid));
        assert_eq!(purchase.map(|p| p.total), Some(20_00));

        let first_price = purchase
            .and_then(|p| p.items.iter().find(|item| item.game == first))
            .map(|item| item.price_at_purchase);

        assert_eq!(first_price, Some(12_00));

        Ok(())
    }

    #[tokio::test]
    async fn ranking_is_dense_after_purchases() -> TestResult {
        let ctx = TestContext::new().await;
        let popular = ctx.create_game("Popular", 10_00).await?;
        let steady = ctx.create_game("Steady", 10_00).await?;
        let niche = ctx.create_game("Niche", 10_00).await?;

        for (email, games) in [
            ("a@example.com", vec![popular, steady]),
            ("b@example.com", vec![popular]),
            ("c@example.com", vec![steady, popular]),
        ] {
            let user = ctx.create_user(email).await?;

            ctx.users.deposit(user, 20_00).await?;
            ctx.fill_cart(user, &games).await?;
            ctx.checkout.checkout(user, None, Timestamp::now()).await?;
        }

        let ranking = ctx.games.list_rankings().await?;
        let position = |game: GameUuid| {
            ranking
                .iter()
                .find(|row| row.game == game)
                .map(|row| (row.sales_count, row.rank_position))
        };

        assert_eq!(position(popular), Some((3, 1)));
        assert_eq!(position(steady), Some((2, 2)));
        assert_eq!(position(niche), Some((0, 3)));

        Ok(())
    }

    #[tokio::test]
    async fn multiple_units_raise_sales_by_quantity() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("bulk@example.com").await?;
        let bundle = ctx.create_game("Bundle", 5_00).await?;
        let single = ctx.create_game("Single", 7_00).await?;

        ctx.users.deposit(user, 30_00).await?;

        for (game, quantity) in [(bundle, 3), (single, 1)] {
            ctx.carts
                .add_item(user, NewCartItem { game, quantity })
                .await?;
        }

        let receipt = ctx.checkout.checkout(user, None, Timestamp::now()).await?;

        assert_eq!(receipt.purchase.total, 22_00);
        assert_eq!(receipt.games_count, 2);
        assert_eq!(receipt.items_count, 4);
        assert_eq!(receipt.balance, 8_00);

        let bundle_quantity = receipt
            .items
            .iter()
            .find(|item| item.game == bundle)
            .map(|item| item.quantity);

        assert_eq!(bundle_quantity, Some(3));

        let ranking = ctx.games.list_rankings().await?;
        let position = |game: GameUuid| {
            ranking
                .iter()
                .find(|row| row.game == game)
                .map(|row| (row.sales_count, row.rank_position))
        };

        assert_eq!(position(bundle), Some((3, 1)));
        assert_eq!(position(single), Some((1, 2)));

        Ok(())
    }

    #[tokio::test]
    async fn wallet_balance_matches_ledger() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("ledger@example.com").await?;
        let first = ctx.create_game("One", 15_00).await?;
        let second = ctx.create_game("Two", 25_00).await?;

        ctx.users.deposit(user, 30_00).await?;
        ctx.users.deposit(user, 20_00).await?;

        ctx.fill_cart(user, &[first]).await?;
        ctx.checkout.checkout(user, None, Timestamp::now()).await?;

        ctx.fill_cart(user, &[second]).await?;
        ctx.checkout.checkout(user, None, Timestamp::now()).await?;

        let wallet = ctx.users.get_wallet(user).await?;

        let deposits: u64 = wallet
            .transactions
            .iter()
            .filter(|entry| entry.kind == WalletTransactionKind::Deposit)
            .map(|entry| entry.amount)
            .sum();

        let spent: u64 = ctx
            .checkout
            .list_purchases(user)
            .await?
            .iter()
            .map(|purchase| purchase.final_amount)
            .sum();

        assert_eq!(deposits, 50_00);
        assert_eq!(spent, 40_00);
        assert_eq!(wallet.balance, deposits - spent);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_redemptions_respect_usage_limit() -> TestResult {
        let ctx = TestContext::new().await;
        let game = ctx.create_game("Race", 40_00).await?;
        let first = ctx.create_user("first@example.com").await?;
        let second = ctx.create_user("second@example.com").await?;

        let code = ctx
            .create_discount(
                "ONLYONE",
                DiscountRules {
                    usage_limit: Some(1),
                    ..percent_rules(50)
                },
            )
            .await?;

        for user in [first, second] {
            ctx.users.deposit(user, 40_00).await?;
            ctx.fill_cart(user, &[game]).await?;
        }

        let now = Timestamp::now();

        let (a, b) = tokio::join!(
            ctx.checkout.checkout(first, Some("ONLYONE".to_string()), now),
            ctx.checkout.checkout(second, Some("ONLYONE".to_string()), now),
        );

        let discounted = [a, b]
            .iter()
            .filter(|result| {
                matches!(
                    result,
                    Ok(receipt) if receipt.purchase.discount_code == Some(code.uuid)
                )
            })
            .count();

        assert_eq!(discounted, 1, "exactly one checkout may redeem the code");
        assert!(!ctx.discounts.get_discount_code(code.uuid).await?.active);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_checkouts_of_one_user_never_overdraw() -> TestResult {
        let ctx = TestContext::new().await;
        let user = ctx.create_user("double@example.com").await?;
        let game = ctx.create_game("Once Only", 50_00).await?;

        ctx.users.deposit(user, 50_00).await?;
        ctx.fill_cart(user, &[game]).await?;

        let now = Timestamp::now();

        let (a, b) = tokio::join!(
            ctx.checkout.checkout(user, None, now),
            ctx.checkout.checkout(user, None, now),
        );

        let results = [a, b];

        let succeeded = results.iter().filter(|result| result.is_ok()).count();
        let empty = results
            .iter()
            .filter(|result| {
                matches!(
                    result,
                    Err(CheckoutServiceError::Rejected(CheckoutRejection::EmptyCart))
                )
            })
            .count();

        assert_eq!(succeeded, 1, "exactly one checkout should commit");
        assert_eq!(empty, 1, "the other should find the cart emptied");
        assert_eq!(ctx.users.get_wallet(user).await?.balance, 0);
        assert_eq!(ctx.checkout.list_purchases(user).await?.len(), 1);

        Ok(())
    }
}
