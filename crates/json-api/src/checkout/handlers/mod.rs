//! Checkout Handlers

pub(crate) mod create;
pub(crate) mod purchases;
