//! Discounts
//!
//! Discount codes reduce an order total either by a percentage of the total or by a
//! fixed amount. This module holds the arithmetic; [`rules`] holds the eligibility
//! checks that decide whether a code may be redeemed at all.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod rules;

pub use rules::{DiscountRejection, DiscountRules, RedemptionContext, evaluate};

/// Largest percentage a code may take off.
pub const MAX_PERCENTAGE: Decimal = Decimal::ONE_HUNDRED;

/// Decimal places a percentage may carry, e.g. `12.25`.
pub const MAX_PERCENTAGE_SCALE: u32 = 2;

/// Errors specific to discount calculations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Discount value is zero, negative, above the allowed range or too precise.
    #[error("discount value out of range")]
    ValueOutOfRange,
}

/// How a discount code reduces the order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountKind {
    /// Take `percentage`% off the order total (e.g. `10` for 10%).
    Percent {
        /// Percentage in the range `(0, 100]`.
        percentage: Decimal,
    },

    /// Take a fixed amount (minor units) off the order total.
    Fixed {
        /// Amount in minor units, greater than zero.
        amount: u64,
    },
}

impl DiscountKind {
    /// Storage name of the discount type.
    #[must_use]
    pub const fn to_str(&self) -> &'static str {
        match self {
            Self::Percent { .. } => "percent",
            Self::Fixed { .. } => "fixed",
        }
    }

    /// Check that the discount value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::ValueOutOfRange`] for a non-positive value, a
    /// percentage above [`MAX_PERCENTAGE`] or one with more than
    /// [`MAX_PERCENTAGE_SCALE`] decimal places.
    pub fn validate(&self) -> Result<(), DiscountError> {
        let valid = match self {
            Self::Percent { percentage } => {
                percentage.is_sign_positive()
                    && !percentage.is_zero()
                    && *percentage <= MAX_PERCENTAGE
                    && percentage.normalize().scale() <= MAX_PERCENTAGE_SCALE
            }
            Self::Fixed { amount } => *amount > 0,
        };

        if valid {
            Ok(())
        } else {
            Err(DiscountError::ValueOutOfRange)
        }
    }

    /// Amount this discount takes off `total`, before capping.
    ///
    /// # Errors
    ///
    /// Returns [`DiscountError::PercentConversion`] if the percentage calculation
    /// cannot be represented in minor units.
    pub fn amount_off(&self, total: u64) -> Result<u64, DiscountError> {
        match self {
            Self::Percent { percentage } => percent_of_minor(*percentage, total),
            Self::Fixed { amount } => Ok(*amount),
        }
    }
}

/// Result of applying a discount to an order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    /// Order total before the discount.
    pub total: u64,

    /// Amount taken off, never more than `total`.
    pub discount_amount: u64,

    /// `max(0, total - discount)`.
    pub final_amount: u64,
}

/// Apply a discount to an order total.
///
/// The discount amount is capped at the total so that
/// `total == discount_amount + final_amount` always holds.
///
/// # Errors
///
/// Returns an error if the percentage calculation overflows.
pub fn apply(kind: &DiscountKind, total: u64) -> Result<AppliedDiscount, DiscountError> {
    let discount_amount = kind.amount_off(total)?.min(total);

    Ok(AppliedDiscount {
        total,
        discount_amount,
        final_amount: total - discount_amount,
    })
}

/// Calculate `percentage`% of a minor unit amount, rounded to the nearest minor
/// unit with midpoints rounded away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows or
/// the result cannot be represented as a `u64`.
pub fn percent_of_minor(percentage: Decimal, minor: u64) -> Result<u64, DiscountError> {
    let minor = Decimal::from_u64(minor).ok_or(DiscountError::PercentConversion)?;

    percentage
        .checked_mul(minor)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(DiscountError::PercentConversion)
}
