//! Discount codes
//!
//! Admin lifecycle of discount codes, redemption previews and the deactivation
//! sweeper. The eligibility rules themselves live in `storefront_core`.

pub mod data;
pub mod errors;
pub(crate) mod evaluator;
pub mod models;
mod patch;
pub mod records;
pub(crate) mod repository;
pub mod service;
pub mod sweeper;

pub use errors::DiscountsServiceError;
pub use service::*;
pub use sweeper::{DiscountSweeper, MockDiscountSweeper, PgDiscountSweeper, SweepReport};
