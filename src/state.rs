use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::Store;

/// The shared application state.
///
/// Cloned into every handler by Axum's state extraction; both fields are
/// cheap handles. The store is passed explicitly rather than living in a
/// process-wide global so tests can stand up isolated instances.
#[derive(Clone)]
pub struct AppState {
    /// Handle to the item store (connection pool plus backend kind).
    pub store: Store,
    /// The application configuration.
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Store, config: AppConfig) -> Self {
        Self { store, config: Arc::new(config) }
    }
}
