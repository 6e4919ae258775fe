//! Checkout Repositories

mod purchases;

pub(crate) use purchases::PgPurchasesRepository;
