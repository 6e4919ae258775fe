//! Checkout
//!
//! A checkout moves through a fixed sequence of stages:
//!
//! ```text
//! Begin → CartLoaded → OwnershipChecked → DiscountResolved → FundsVerified → Committed
//! ```
//!
//! Any stage except `Committed` may fail, which abandons the whole checkout. The
//! functions here make the per-stage decisions; the storage layer performs the reads
//! and writes between them.

use std::fmt;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cart::{CartLine, CartTotalError, cart_total, units},
    discounts::{AppliedDiscount, DiscountRejection},
};

/// Stage a checkout has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStage {
    /// Transaction opened, nothing read yet.
    Begin,

    /// Cart lines and total are known.
    CartLoaded,

    /// No cart line is already owned by the buyer.
    OwnershipChecked,

    /// The discount (if any) has been evaluated and the final amount is known.
    DiscountResolved,

    /// The buyer's balance covers the final amount.
    FundsVerified,

    /// All writes succeeded and the transaction committed.
    Committed,
}

impl CheckoutStage {
    /// The stage that follows this one, or `None` once committed.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Begin => Some(Self::CartLoaded),
            Self::CartLoaded => Some(Self::OwnershipChecked),
            Self::OwnershipChecked => Some(Self::DiscountResolved),
            Self::DiscountResolved => Some(Self::FundsVerified),
            Self::FundsVerified => Some(Self::Committed),
            Self::Committed => None,
        }
    }

    /// Stable lowercase name, used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::CartLoaded => "cart_loaded",
            Self::OwnershipChecked => "ownership_checked",
            Self::DiscountResolved => "discount_resolved",
            Self::FundsVerified => "funds_verified",
            Self::Committed => "committed",
        }
    }
}

impl fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attempted to move a checkout to a stage that does not directly follow the current one.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("illegal checkout transition from {from} to {to}")]
pub struct IllegalTransition {
    /// Current stage.
    pub from: CheckoutStage,

    /// Requested stage.
    pub to: CheckoutStage,
}

/// Tracks the stage of a single checkout and refuses out-of-order transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutProgress {
    stage: CheckoutStage,
}

impl Default for CheckoutProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutProgress {
    /// A checkout at [`CheckoutStage::Begin`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: CheckoutStage::Begin,
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> CheckoutStage {
        self.stage
    }

    /// Move to `to`, which must be the stage directly after the current one.
    ///
    /// # Errors
    ///
    /// Returns [`IllegalTransition`] if `to` does not follow the current stage.
    pub fn advance(&mut self, to: CheckoutStage) -> Result<CheckoutStage, IllegalTransition> {
        if self.stage.next() != Some(to) {
            return Err(IllegalTransition {
                from: self.stage,
                to,
            });
        }

        self.stage = to;

        Ok(to)
    }
}

/// Business-rule reasons a checkout is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutRejection {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// The buyer already owns a game in the cart.
    #[error("game {game} is already owned")]
    AlreadyOwned {
        /// First owned game found, in cart order.
        game: Uuid,
    },

    /// The supplied discount code cannot be redeemed.
    #[error(transparent)]
    Discount(#[from] DiscountRejection),

    /// The wallet balance does not cover the final amount.
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds {
        /// Balance at the time of the check.
        balance: u64,

        /// Amount the checkout needs.
        required: u64,
    },

    /// Cart amounts do not fit in the money representation.
    #[error("cart total overflowed")]
    TotalOverflow,
}

impl CheckoutRejection {
    /// Short machine-readable reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::EmptyCart => "empty_cart",
            Self::AlreadyOwned { .. } => "already_owned",
            Self::Discount(rejection) => rejection.reason(),
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::TotalOverflow => "invalid_cart",
        }
    }
}

impl From<CartTotalError> for CheckoutRejection {
    fn from(error: CartTotalError) -> Self {
        match error {
            CartTotalError::Empty => Self::EmptyCart,
            CartTotalError::Overflow => Self::TotalOverflow,
        }
    }
}

/// Amounts settled by a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Sum of cart lines before any discount.
    pub total: u64,

    /// Amount taken off by the discount code.
    pub discount_amount: u64,

    /// Amount debited from the wallet.
    pub final_amount: u64,

    /// Number of units bought.
    pub items_count: u64,
}

/// Total the loaded cart (`Begin → CartLoaded`).
///
/// # Errors
///
/// Returns [`CheckoutRejection::EmptyCart`] for an empty cart.
pub fn load_total(lines: &[CartLine]) -> Result<u64, CheckoutRejection> {
    Ok(cart_total(lines)?)
}

/// Refuse the checkout if any cart line is already owned (`CartLoaded → OwnershipChecked`).
///
/// # Errors
///
/// Returns [`CheckoutRejection::AlreadyOwned`] for the first owned line in cart order.
pub fn ensure_not_owned(
    lines: &[CartLine],
    owned: &FxHashSet<Uuid>,
) -> Result<(), CheckoutRejection> {
    match lines.iter().find(|line| owned.contains(&line.game)) {
        Some(line) => Err(CheckoutRejection::AlreadyOwned { game: line.game }),
        None => Ok(()),
    }
}

/// Resolve the settlement from the cart and the optional discount
/// (`OwnershipChecked → DiscountResolved`).
#[must_use]
pub fn settle(lines: &[CartLine], total: u64, discount: Option<&AppliedDiscount>) -> Settlement {
    let (discount_amount, final_amount) = discount.map_or((0, total), |applied| {
        (applied.discount_amount, applied.final_amount)
    });

    Settlement {
        total,
        discount_amount,
        final_amount,
        items_count: units(lines),
    }
}

/// Refuse the checkout if the balance cannot cover the final amount
/// (`DiscountResolved → FundsVerified`).
///
/// # Errors
///
/// Returns [`CheckoutRejection::InsufficientFunds`] when `balance < required`.
pub fn verify_funds(balance: u64, required: u64) -> Result<(), CheckoutRejection> {
    if balance < required {
        return Err(CheckoutRejection::InsufficientFunds { balance, required });
    }

    Ok(())
}
