//! Cart Loader
//!
//! Reads a user's cart lines at the games' current prices. Runs inside the
//! caller's transaction so checkout sees one consistent snapshot.

use sqlx::{Postgres, Transaction};
use storefront_core::cart::{CartLine, CartTotalError, cart_total};

use crate::domain::{
    carts::{
        models::Cart,
        records::CartUuid,
        repositories::{PgCartItemsRepository, PgCartsRepository},
    },
    users::records::UserUuid,
};

/// A cart as read from storage, before totalling.
#[derive(Debug, Clone)]
pub(crate) struct LoadedCart {
    pub(crate) uuid: CartUuid,
    pub(crate) user: UserUuid,
    pub(crate) lines: Vec<CartLine>,
}

impl LoadedCart {
    /// Total the cart, treating an empty cart as zero.
    pub(crate) fn into_cart(self) -> Result<Cart, CartTotalError> {
        let total = match cart_total(&self.lines) {
            Ok(total) => total,
            Err(CartTotalError::Empty) => 0,
            Err(error @ CartTotalError::Overflow) => return Err(error),
        };

        Ok(Cart {
            uuid: self.uuid,
            user: self.user,
            lines: self.lines,
            total,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CartLoader {
    carts: PgCartsRepository,
    items: PgCartItemsRepository,
}

impl CartLoader {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            carts: PgCartsRepository::new(),
            items: PgCartItemsRepository::new(),
        }
    }

    /// Load the user's cart lines in insertion order.
    ///
    /// An empty cart is not an error here; fails with `RowNotFound` when the user
    /// has no cart at all.
    pub(crate) async fn load(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<LoadedCart, sqlx::Error> {
        let cart = self.carts.get_user_cart(tx, user).await?;

        let lines = self
            .items
            .get_cart_items(tx, cart.uuid)
            .await?
            .into_iter()
            .map(CartLine::from)
            .collect();

        Ok(LoadedCart {
            uuid: cart.uuid,
            user,
            lines,
        })
    }
}
