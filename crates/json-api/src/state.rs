//! State

use std::sync::Arc;

use storefront_app::context::AppContext;
use tokio::sync::Notify;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Wakes the discount sweeper ahead of its next scheduled run.
    pub(crate) sweep_trigger: Arc<Notify>,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, sweep_trigger: Arc<Notify>) -> Self {
        Self { app, sweep_trigger }
    }

    #[must_use]
    pub(crate) fn from_app_context(app: AppContext, sweep_trigger: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self::new(app, sweep_trigger))
    }
}
