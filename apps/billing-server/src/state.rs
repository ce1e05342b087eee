//! Shared application state.

use std::sync::Arc;

use billing_db::Database;

use crate::config::ServerConfig;

/// State shared by all request handlers.
///
/// Cheap to clone: the database holds a pool handle and the config is
/// behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        AppState {
            db,
            config: Arc::new(config),
        }
    }
}
