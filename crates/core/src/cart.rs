//! Cart lines and totals

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while totalling a cart.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartTotalError {
    /// The cart has no lines.
    #[error("cart is empty")]
    Empty,

    /// Multiplying or summing line amounts overflowed.
    #[error("cart total overflowed")]
    Overflow,
}

/// A single line of a user's cart, priced at the game's current price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Game being bought.
    pub game: Uuid,

    /// Display title of the game.
    pub title: String,

    /// Current unit price in minor units.
    pub unit_price: u64,

    /// Number of units, at least one.
    pub quantity: u32,
}

impl CartLine {
    /// Line subtotal (`unit_price × quantity`).
    ///
    /// # Errors
    ///
    /// Returns [`CartTotalError::Overflow`] if the product does not fit in a `u64`.
    pub fn subtotal(&self) -> Result<u64, CartTotalError> {
        self.unit_price
            .checked_mul(u64::from(self.quantity))
            .ok_or(CartTotalError::Overflow)
    }
}

/// Calculates the total of a set of cart lines as `Σ(price × quantity)`.
///
/// # Errors
///
/// - [`CartTotalError::Empty`]: no lines were provided.
/// - [`CartTotalError::Overflow`]: the total does not fit in a `u64`.
pub fn cart_total(lines: &[CartLine]) -> Result<u64, CartTotalError> {
    if lines.is_empty() {
        return Err(CartTotalError::Empty);
    }

    lines.iter().try_fold(0_u64, |acc, line| {
        acc.checked_add(line.subtotal()?)
            .ok_or(CartTotalError::Overflow)
    })
}

/// Total number of units across all lines.
pub fn units(lines: &[CartLine]) -> u64 {
    lines.iter().map(|line| u64::from(line.quantity)).sum()
}
