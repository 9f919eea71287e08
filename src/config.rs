use serde::{Deserialize, Serialize};
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{LifelogError, Result};

/// Hard cap on list results; requested limits are clamped to this.
pub const LIST_LIMIT_MAX: usize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Document store connection string. Required; no default.
    pub database_url: String,
    /// Namespace (schema) holding the collections. Required; no default.
    pub namespace: String,
    pub storage_path: PathBuf,
    pub max_upload_mb: usize,
    pub request_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub list_limit: usize,
    /// Seconds between orphaned-file sweeps; 0 disables the janitor.
    pub sweep_interval_secs: u64,
    pub db_max_connections: u32,
    pub db_connect_timeout_secs: u64,
}

/// Command-line overrides applied on top of the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub host: Option<IpAddr>,
    pub port: Option<u16>,
    pub storage_path: Option<PathBuf>,
    pub database_url: Option<String>,
    pub namespace: Option<String>,
}

impl Config {
    /// Build the configuration from the environment plus CLI overrides.
    /// The connection string and namespace are mandatory; missing either
    /// is a fatal startup error.
    pub fn load(overrides: Overrides) -> Result<Self> {
        let database_url = overrides
            .database_url
            .or_else(|| env::var("DATABASE_URL").ok())
            .ok_or_else(|| {
                LifelogError::InvalidConfig(
                    "DATABASE_URL (or --database-url) is required".to_string(),
                )
            })?;
        let namespace = overrides
            .namespace
            .or_else(|| env::var("LIFELOG_NAMESPACE").ok())
            .ok_or_else(|| {
                LifelogError::InvalidConfig(
                    "LIFELOG_NAMESPACE (or --namespace) is required".to_string(),
                )
            })?;

        Ok(Self {
            host: match overrides.host {
                Some(host) => host,
                None => env_parse("LIFELOG_HOST", IpAddr::from([0, 0, 0, 0]))?,
            },
            port: match overrides.port {
                Some(port) => port,
                None => env_parse("LIFELOG_PORT", 8080)?,
            },
            database_url,
            namespace,
            storage_path: overrides
                .storage_path
                .or_else(|| env::var("LIFELOG_STORAGE_PATH").ok().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_mb: env_parse("LIFELOG_MAX_UPLOAD_MB", 512)?,
            request_timeout_secs: env_parse("LIFELOG_REQUEST_TIMEOUT_SECS", 30)?,
            upload_timeout_secs: env_parse("LIFELOG_UPLOAD_TIMEOUT_SECS", 300)?,
            list_limit: env_parse("LIFELOG_LIST_LIMIT", 100)?.min(LIST_LIMIT_MAX),
            sweep_interval_secs: env_parse("LIFELOG_SWEEP_INTERVAL_SECS", 3600)?,
            db_max_connections: env_parse("LIFELOG_DB_MAX_CONNECTIONS", 10)?,
            db_connect_timeout_secs: env_parse("LIFELOG_DB_CONNECT_TIMEOUT_SECS", 10)?,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| LifelogError::InvalidConfig(format!("invalid value {raw:?} for {key}"))),
        Err(_) => Ok(default),
    }
}

impl From<&Config> for api::Config {
    fn from(config: &Config) -> Self {
        api::Config {
            host: config.host,
            port: config.port,
            list_limit: config.list_limit,
            list_limit_max: LIST_LIMIT_MAX,
            max_upload_mb: config.max_upload_mb,
            request_timeout_secs: config.request_timeout_secs,
            upload_timeout_secs: config.upload_timeout_secs,
            uploads_root: config.storage_path.clone(),
        }
    }
}

impl From<&Config> for docstore::Config {
    fn from(config: &Config) -> Self {
        docstore::Config {
            url: config.database_url.clone(),
            namespace: config.namespace.clone(),
            max_connections: config.db_max_connections,
            connect_timeout_secs: config.db_connect_timeout_secs,
        }
    }
}
