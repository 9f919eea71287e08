use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use docstore::DocumentStore;
use filestore::FileStore;

use crate::handlers::{self, export, gps, health, sentiments, vlogs, AppState};
use crate::{ApiError, ApiResult, Config};

pub struct Server {
    config: Config,
    app_state: AppState,
}

impl Server {
    pub fn new(config: Config, store: Arc<dyn DocumentStore>, files: Arc<FileStore>) -> Self {
        let app_state = AppState {
            store,
            files,
            config: Arc::new(config.clone()),
        };

        Self { config, app_state }
    }

    pub async fn start(&self) -> ApiResult<()> {
        let app = self.create_router();

        let addr = self.config.bind_address();
        tracing::info!("starting API server on {}", addr);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ApiError::Internal(format!("failed to bind to {addr}: {e}")))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ApiError::Internal(format!("server error: {e}")))?;

        Ok(())
    }

    pub fn create_router(&self) -> Router {
        let upload_bytes = self.config.max_upload_mb * 1024 * 1024;
        let request_timeout = Duration::from_secs(self.config.request_timeout_secs);
        let upload_timeout = Duration::from_secs(self.config.upload_timeout_secs);

        // Upload route: its own timeout and a body limit sized for video
        // payloads rather than JSON bodies.
        let upload_routes = Router::new()
            .route("/api/vlogs/upload", post(vlogs::upload_vlog))
            .layer(TimeoutLayer::new(upload_timeout))
            .layer(DefaultBodyLimit::max(upload_bytes))
            .layer(RequestBodyLimitLayer::new(upload_bytes));

        let api_routes = Router::new()
            // Vlog operations
            .route("/api/vlogs", post(vlogs::create_vlog).get(vlogs::list_vlogs))
            .route("/api/vlogs/download/:identifier", get(vlogs::download_vlog))
            .route("/api/vlogs/:id", get(vlogs::get_vlog))
            // Sentiment operations
            .route(
                "/api/sentiments",
                post(sentiments::create_sentiment).get(sentiments::list_sentiments),
            )
            .route("/api/sentiments/:id", get(sentiments::get_sentiment))
            // GPS operations
            .route(
                "/api/gps",
                post(gps::create_gps_coordinate).get(gps::list_gps_coordinates),
            )
            .route("/api/gps/:id", get(gps::get_gps_coordinate))
            // Export and landing pages
            .route("/api/export/all", get(export::export_all))
            .route("/export", get(export::export_page))
            .route("/", get(export::index))
            // Health check
            .route("/health", get(health::health_check))
            .layer(TimeoutLayer::new(request_timeout));

        upload_routes
            .merge(api_routes)
            .nest_service("/uploads", ServeDir::new(&self.config.uploads_root))
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
            .fallback(handlers::not_found)
            .with_state(self.app_state.clone())
    }
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => tracing::info!("received SIGINT"),
        _ = terminate => tracing::info!("received SIGTERM"),
    }
}
