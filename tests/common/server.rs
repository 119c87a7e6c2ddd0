//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own catalog database.

use super::constants::*;
use super::fixtures::create_test_catalog;
use instrument_catalog_server::catalog_store::SqliteCatalogStore;
use instrument_catalog_server::notifications::{BroadcastChangeNotifier, CatalogChange};
use instrument_catalog_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use instrument_catalog_server::user::{Actor, StaticTokenAuthorizer, UserRole};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Test server instance with an isolated catalog
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Catalog store for direct database access in tests
    pub catalog_store: Arc<SqliteCatalogStore>,

    /// Receives every change notification the server emits
    pub changes: broadcast::Receiver<CatalogChange>,

    // Private fields - keep resources alive until drop
    _temp_catalog_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the catalog cannot be created, the port cannot be bound,
    /// or the server doesn't become ready within timeout.
    pub async fn spawn() -> Self {
        let (temp_catalog_dir, store) =
            create_test_catalog().expect("Failed to create test catalog");
        let catalog_store = Arc::new(store);

        let authorizer = StaticTokenAuthorizer::new()
            .with_token(REGULAR_TOKEN, Actor::new(REGULAR_USER, UserRole::Regular))
            .with_token(CURATOR_TOKEN, Actor::new(CURATOR_USER, UserRole::Curator))
            .with_token(ADMIN_TOKEN, Actor::new(ADMIN_USER, UserRole::Admin));

        let notifier = BroadcastChangeNotifier::default();
        let changes = notifier.subscribe();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            metrics_port: 0,
            requests_logging_level: RequestsLoggingLevel::None,
        };

        let app = make_app(
            config,
            catalog_store.clone(),
            Arc::new(authorizer),
            Arc::new(notifier),
        )
        .expect("Failed to build app");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            catalog_store,
            changes,
            _temp_catalog_dir: temp_catalog_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// Drains the change notifications received so far.
    pub fn drain_changes(&mut self) -> Vec<CatalogChange> {
        let mut changes = Vec::new();
        while let Ok(change) = self.changes.try_recv() {
            changes.push(change);
        }
        changes
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
