use clap::{Arg, Command};
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod error;

use app::App;
use config::{Config, Overrides};
use error::LifelogError;

#[tokio::main]
async fn main() -> Result<(), LifelogError> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = Command::new("lifelog")
        .version("0.1.0")
        .about("Data-collection backend for vlogs, sentiments, and GPS coordinates")
        .arg(
            Arg::new("host")
                .long("host")
                .help("Address to bind (env LIFELOG_HOST)")
                .required(false),
        )
        .arg(
            Arg::new("port")
                .long("port")
                .help("Port to listen on (env LIFELOG_PORT)")
                .required(false),
        )
        .arg(
            Arg::new("storage-path")
                .long("storage-path")
                .help("Directory for uploaded video files (env LIFELOG_STORAGE_PATH)")
                .required(false),
        )
        .arg(
            Arg::new("database-url")
                .long("database-url")
                .help("Document store connection string (env DATABASE_URL)")
                .required(false),
        )
        .arg(
            Arg::new("namespace")
                .long("namespace")
                .help("Database namespace holding the collections (env LIFELOG_NAMESPACE)")
                .required(false),
        )
        .get_matches();

    let overrides = Overrides {
        host: matches
            .get_one::<String>("host")
            .map(|s| IpAddr::from_str(s))
            .transpose()
            .map_err(|e| LifelogError::InvalidConfig(format!("invalid host address: {e}")))?,
        port: matches
            .get_one::<String>("port")
            .map(|s| s.parse::<u16>())
            .transpose()
            .map_err(|e| LifelogError::InvalidConfig(format!("invalid port: {e}")))?,
        storage_path: matches.get_one::<String>("storage-path").map(PathBuf::from),
        database_url: matches.get_one::<String>("database-url").cloned(),
        namespace: matches.get_one::<String>("namespace").cloned(),
    };

    let config = Config::load(overrides)?;
    info!(
        namespace = %config.namespace,
        storage_path = %config.storage_path.display(),
        "starting lifelog backend"
    );

    let app = App::new(config).await?;
    app.start().await
}
