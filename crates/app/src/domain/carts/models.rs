//! Cart Models

use storefront_core::cart::CartLine;

use crate::domain::{carts::records::CartUuid, users::records::UserUuid};

/// A user's cart as the Cart Loader sees it.
#[derive(Debug, Clone)]
pub struct Cart {
    pub uuid: CartUuid,
    pub user: UserUuid,
    pub lines: Vec<CartLine>,

    /// `Σ(unit_price × quantity)`; zero for an empty cart.
    pub total: u64,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
