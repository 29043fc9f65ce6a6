use std::sync::Arc;

use satprep_storage::ImageLifecycle;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: satprep_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Question image storage and cleanup.
    pub images: Arc<ImageLifecycle>,
}
