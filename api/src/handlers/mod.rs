pub mod export;
pub mod gps;
pub mod health;
pub mod sentiments;
pub mod vlogs;

use std::sync::Arc;

use serde::Deserialize;

use docstore::DocumentStore;
use filestore::FileStore;

use crate::error::ApiError;
use crate::Config;

/// Shared application state injected into all handlers via axum's State
/// extractor. Both stores are constructed at startup and passed in;
/// nothing here is globally mutable.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub files: Arc<FileStore>,
    pub config: Arc<Config>,
}

/// Query parameters shared by all list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub limit: Option<usize>,
}

impl AppState {
    /// Requested page size, defaulted and clamped to the configured cap.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.config.list_limit)
            .min(self.config.list_limit_max)
    }
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("route".to_string())
}
