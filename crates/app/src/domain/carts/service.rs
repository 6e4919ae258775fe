//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::NewCartItem,
            errors::CartsServiceError,
            loader::CartLoader,
            models::Cart,
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        checkout::repositories::PgPurchasesRepository,
        games::{records::GameUuid, repositories::PgGamesRepository},
        users::records::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    loader: CartLoader,
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
    games: PgGamesRepository,
    purchases: PgPurchasesRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            loader: CartLoader::new(),
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
            games: PgGamesRepository::new(),
            purchases: PgPurchasesRepository::new(),
        }
    }

    async fn load_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Cart, CartsServiceError> {
        self.loader
            .load(tx, user)
            .await?
            .into_cart()
            .map_err(|_overflow| CartsServiceError::TotalOverflow)
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.load_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }

    #[tracing::instrument(
        name = "carts.service.add_item",
        skip(self, item),
        fields(user_uuid = %user, game_uuid = %item.game, quantity = item.quantity),
        err
    )]
    async fn add_item(&self, user: UserUuid, item: NewCartItem) -> Result<Cart, CartsServiceError> {
        if item.quantity == 0 {
            return Err(CartsServiceError::InvalidQuantity);
        }

        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_user_cart(&mut tx, user).await?;

        self.games
            .find_game(&mut tx, item.game)
            .await?
            .ok_or(CartsServiceError::GameNotFound)?;

        let owned = self
            .purchases
            .owned_games(&mut tx, user, &[item.game.into_uuid()])
            .await?;

        if !owned.is_empty() {
            return Err(CartsServiceError::AlreadyOwned);
        }

        self.items
            .upsert_cart_item(&mut tx, cart.uuid, item.game, item.quantity)
            .await?;

        let cart = self.load_cart(&mut tx, user).await?;

        tx.commit().await?;

        debug!(cart_uuid = %cart.uuid, lines = cart.lines.len(), "added cart item");

        Ok(cart)
    }

    async fn remove_item(&self, user: UserUuid, game: GameUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let cart = self.carts.get_user_cart(&mut tx, user).await?;

        let rows_affected = self.items.delete_cart_item(&mut tx, cart.uuid, game).await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let cart = self.load_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// The user's cart at current game prices.
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Add a game to the user's cart, replacing the quantity if it is already there.
    async fn add_item(&self, user: UserUuid, item: NewCartItem) -> Result<Cart, CartsServiceError>;

    /// Remove a game from the user's cart.
    async fn remove_item(&self, user: UserUuid, game: GameUuid) -> Result<Cart, CartsServiceError>;
}
