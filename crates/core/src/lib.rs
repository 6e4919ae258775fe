//! Storefront Core
//!
//! Pure decision logic for the storefront checkout engine: cart totals, discount
//! code eligibility and pricing, checkout settlement and sales ranking.
//!
//! Nothing in this crate performs I/O. Persistence and transaction handling live
//! in `storefront-app`, which feeds the values it reads from storage into these
//! functions and acts on their verdicts.

pub mod cart;
pub mod checkout;
pub mod discounts;
pub mod ranking;
