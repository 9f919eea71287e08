mod error;
mod handlers;
mod schema;
mod server;

pub use error::{ApiError, ApiResult};
pub use handlers::AppState;
pub use schema::{
    validate_gps, validate_sentiment, validate_vlog, validate_vlog_upload, FieldError,
    ValidationErrors,
};
pub use server::Server;

use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Default page size for list endpoints.
    pub list_limit: usize,
    /// Hard cap no request can exceed; also bounds export dumps.
    pub list_limit_max: usize,
    pub max_upload_mb: usize,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    /// Root of the file store, served read-only under /uploads.
    pub uploads_root: PathBuf,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
