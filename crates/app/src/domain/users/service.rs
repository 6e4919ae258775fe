//! Users Service

use async_trait::async_trait;
use mockall::automock;
use tracing::{Span, info};

use crate::{
    database::{DEFAULT_LOCK_TIMEOUT, Db},
    domain::{
        amounts::{display_amount, fits_column},
        carts::{records::CartUuid, repositories::PgCartsRepository},
        users::{
            UsersServiceError,
            data::NewUser,
            models::{DepositReceipt, Wallet},
            records::{UserRecord, UserUuid, WalletTransactionKind},
            repository::PgUsersRepository,
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgUsersService {
    db: Db,
    users: PgUsersRepository,
    carts: PgCartsRepository,
}

impl PgUsersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            users: PgUsersRepository::new(),
            carts: PgCartsRepository::new(),
        }
    }
}

#[async_trait]
impl UsersService for PgUsersService {
    #[tracing::instrument(
        name = "users.service.create_user",
        skip(self, user),
        fields(user_uuid = %user.uuid, cart_uuid = tracing::field::Empty),
        err
    )]
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.users.create_user(&mut tx, &user).await?;

        let cart = self
            .carts
            .create_cart(&mut tx, CartUuid::new(), record.uuid)
            .await?;

        Span::current().record("cart_uuid", tracing::field::display(cart.uuid));

        tx.commit().await?;

        info!(user_uuid = %record.uuid, "created user");

        Ok(record)
    }

    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.users.get_user(&mut tx, user).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "users.service.deposit",
        skip(self),
        fields(user_uuid = %user, balance = tracing::field::Empty),
        err
    )]
    async fn deposit(&self, user: UserUuid, amount: u64) -> Result<DepositReceipt, UsersServiceError> {
        if amount == 0 || !fits_column(amount) {
            return Err(UsersServiceError::InvalidAmount);
        }

        let mut tx = self.db.begin_locking_transaction(DEFAULT_LOCK_TIMEOUT).await?;

        let locked = self.users.lock_user(&mut tx, user).await?;

        if !locked
            .wallet_balance
            .checked_add(amount)
            .is_some_and(fits_column)
        {
            return Err(UsersServiceError::InvalidAmount);
        }

        let balance = self.users.credit_wallet(&mut tx, user, amount).await?;

        let transaction = self
            .users
            .create_wallet_transaction(
                &mut tx,
                user,
                WalletTransactionKind::Deposit,
                amount,
                &format!("Deposit of {}", display_amount(amount)),
            )
            .await?;

        tx.commit().await?;

        Span::current().record("balance", balance);

        Ok(DepositReceipt {
            transaction,
            balance,
        })
    }

    async fn get_wallet(&self, user: UserUuid) -> Result<Wallet, UsersServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self.users.get_user(&mut tx, user).await?;

        let transactions = self.users.list_wallet_transactions(&mut tx, user).await?;

        tx.commit().await?;

        Ok(Wallet {
            user,
            balance: record.wallet_balance,
            transactions,
        })
    }
}

#[automock]
#[async_trait]
pub trait UsersService: Send + Sync {
    /// Create a user together with their (empty) cart.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, UsersServiceError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserUuid) -> Result<UserRecord, UsersServiceError>;

    /// Credit the wallet and append a deposit entry to the ledger.
    async fn deposit(&self, user: UserUuid, amount: u64)
    -> Result<DepositReceipt, UsersServiceError>;

    /// Current balance and ledger.
    async fn get_wallet(&self, user: UserUuid) -> Result<Wallet, UsersServiceError>;
}
