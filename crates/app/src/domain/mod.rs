//! Storefront Domain Concerns

pub(crate) mod amounts;
pub mod carts;
pub mod checkout;
pub mod discounts;
pub mod games;
pub mod users;
