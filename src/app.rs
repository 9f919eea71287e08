use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use docstore::{Collection, DocumentStore, PgStore};
use filestore::FileStore;

use crate::config::Config;
use crate::error::{LifelogError, Result};

/// Files younger than this are never swept, protecting uploads still in
/// flight when the janitor runs.
const SWEEP_MIN_AGE: Duration = Duration::from_secs(3600);

/// Wires the document store, the file store, and the API server together
/// and supervises the long-running tasks.
pub struct App {
    config: Config,
    store: Arc<PgStore>,
    files: Arc<FileStore>,
    server: Arc<api::Server>,
}

impl App {
    pub async fn new(config: Config) -> Result<Self> {
        info!("initializing lifelog backend at {}", config.bind_address());

        let store = Arc::new(PgStore::connect(&(&config).into()).await?);
        let files = Arc::new(FileStore::new(&config.storage_path).await?);

        let server = Arc::new(api::Server::new(
            (&config).into(),
            store.clone() as Arc<dyn DocumentStore>,
            files.clone(),
        ));

        Ok(Self {
            config,
            store,
            files,
            server,
        })
    }

    pub async fn start(self) -> Result<()> {
        info!("starting lifelog services");

        let api_task = {
            let server = self.server.clone();
            tokio::spawn(async move { server.start().await })
        };

        let sweep_task = {
            let store = self.store.clone();
            let files = self.files.clone();
            let interval_secs = self.config.sweep_interval_secs;
            tokio::spawn(async move { Self::sweep_orphans(store, files, interval_secs).await })
        };

        tokio::select! {
            result = api_task => match result {
                Ok(Ok(())) => {
                    info!("API server stopped");
                    Ok(())
                }
                Ok(Err(e)) => {
                    error!("API server failed: {}", e);
                    Err(e.into())
                }
                Err(e) => Err(LifelogError::Task(format!("API server task: {e}"))),
            },
            result = sweep_task => {
                error!("orphan sweep task stopped: {:?}", result);
                Err(LifelogError::Task("orphan sweep task exited".to_string()))
            }
        }
    }

    /// Periodic janitor for files whose metadata insert failed after the
    /// file itself was accepted. Store outages skip the round rather than
    /// sweep against an incomplete reference set.
    async fn sweep_orphans(store: Arc<PgStore>, files: Arc<FileStore>, interval_secs: u64) {
        if interval_secs == 0 {
            info!("orphan sweep disabled");
            std::future::pending::<()>().await;
            return;
        }

        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            ticker.tick().await;
            let referenced = match store
                .field_values(Collection::Vlogs, "file_identifier")
                .await
            {
                Ok(values) => values.into_iter().collect::<HashSet<_>>(),
                Err(e) => {
                    warn!("orphan sweep skipped, store unavailable: {}", e);
                    continue;
                }
            };
            match files.sweep_orphans(&referenced, SWEEP_MIN_AGE).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "orphan sweep removed unreferenced videos"),
                Err(e) => warn!("orphan sweep failed: {}", e),
            }
        }
    }
}
