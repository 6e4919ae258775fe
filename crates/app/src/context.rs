//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        carts::{CartsService, PgCartsService},
        checkout::{CheckoutService, PgCheckoutService},
        discounts::{DiscountSweeper, DiscountsService, PgDiscountSweeper, PgDiscountsService},
        games::{GamesService, PgGamesService},
        users::{PgUsersService, UsersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] sqlx::migrate::MigrateError),
}

#[derive(Clone)]
pub struct AppContext {
    pub checkout: Arc<dyn CheckoutService>,
    pub discounts: Arc<dyn DiscountsService>,
    pub sweeper: Arc<dyn DiscountSweeper>,
    pub carts: Arc<dyn CartsService>,
    pub users: Arc<dyn UsersService>,
    pub games: Arc<dyn GamesService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or applying
    /// migrations fails.
    pub async fn from_database_url(
        url: &str,
        max_connections: u32,
        run_migrations: bool,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url, max_connections)
            .await
            .map_err(AppInitError::Database)?;

        if run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;
        }

        Ok(Self::from_db(&Db::new(pool)))
    }

    #[must_use]
    pub fn from_db(db: &Db) -> Self {
        Self {
            checkout: Arc::new(PgCheckoutService::new(db.clone())),
            discounts: Arc::new(PgDiscountsService::new(db.clone())),
            sweeper: Arc::new(PgDiscountSweeper::new(db.clone())),
            carts: Arc::new(PgCartsService::new(db.clone())),
            users: Arc::new(PgUsersService::new(db.clone())),
            games: Arc::new(PgGamesService::new(db.clone())),
            auth: Arc::new(PgAuthService::new(db.clone())),
        }
    }
}
