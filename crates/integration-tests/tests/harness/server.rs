//! Test server wrapper that starts errdoc on a random port

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use errdoc_config::Config;
use errdoc_core::MetricsSink;
use errdoc_server::Server;
use tokio_util::sync::CancellationToken;

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server with the given configuration
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        Self::launch(Server::new(&config)?).await
    }

    /// Start a test server reporting requests to `metrics`
    pub async fn start_with_metrics(config: Config, metrics: Arc<dyn MetricsSink>) -> anyhow::Result<Self> {
        Self::launch(Server::with_metrics(&config, metrics)?).await
    }

    async fn launch(server: Server) -> anyhow::Result<Self> {
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self { addr, shutdown, client })
    }

    /// URL of `path` on the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Sink counting observations per protocol label
#[derive(Default)]
pub struct CountingMetrics {
    http11: AtomicU64,
    other: AtomicU64,
}

impl CountingMetrics {
    pub fn http11(&self) -> u64 {
        self.http11.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.http11() + self.other.load(Ordering::SeqCst)
    }
}

impl MetricsSink for CountingMetrics {
    fn record(&self, protocol: &str, _elapsed: Duration) {
        if protocol == "1.1" {
            self.http11.fetch_add(1, Ordering::SeqCst);
        } else {
            self.other.fetch_add(1, Ordering::SeqCst);
        }
    }
}
