use std::sync::Arc;

use crate::service::PointService;

/// Shared gateway application state.
#[derive(Clone)]
pub struct AppState {
    /// Ledger service (owns stores and the per-user lock registry).
    pub service: Arc<PointService>,
}

impl AppState {
    pub fn new(service: Arc<PointService>) -> Self {
        Self { service }
    }
}
