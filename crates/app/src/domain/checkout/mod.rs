//! Checkout
//!
//! Turns a user's cart into a purchase: ownership, discount redemption, wallet
//! debit and sales ranking all settle in one transaction.

pub mod errors;
pub mod models;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use errors::CheckoutServiceError;
pub use service::*;
