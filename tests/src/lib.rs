//! Shared harness: boots the full router on an ephemeral port against an
//! in-memory document store and a temp-dir file store.

use std::net::IpAddr;
use std::sync::Arc;

use api::{Config, Server};
use docstore::{DocumentStore, MemStore};
use filestore::FileStore;

pub struct TestServer {
    pub base_url: String,
    /// Direct handle to the in-memory store, e.g. to simulate an outage.
    pub store: Arc<MemStore>,
    /// Storage root; dropped (and deleted) with the harness.
    pub storage_dir: tempfile::TempDir,
}

impl TestServer {
    pub fn videos_dir(&self) -> std::path::PathBuf {
        self.storage_dir.path().join("videos")
    }
}

pub async fn start_test_server() -> TestServer {
    let storage_dir = tempfile::tempdir().expect("create temp storage dir");
    let store = Arc::new(MemStore::new());
    let files = Arc::new(
        FileStore::new(storage_dir.path())
            .await
            .expect("create file store"),
    );

    let config = Config {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 0,
        list_limit: 100,
        list_limit_max: 1000,
        max_upload_mb: 64,
        request_timeout_secs: 5,
        upload_timeout_secs: 30,
        uploads_root: storage_dir.path().to_path_buf(),
    };

    let server = Server::new(config, store.clone() as Arc<dyn DocumentStore>, files);
    let router = server.create_router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });

    TestServer {
        base_url: format!("http://{addr}"),
        store,
        storage_dir,
    }
}
