//! Game Handlers

pub(crate) mod rankings;
