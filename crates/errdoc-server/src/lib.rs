mod handler;
mod headers;
mod metrics;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use errdoc_config::Config;
use errdoc_core::{ErrorPageRenderer, MetricsSink, NoopMetrics};
use tower_http::trace::TraceLayer;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration without metrics reporting
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_metrics(config, Arc::new(NoopMetrics))
    }

    /// Build the server, reporting every request to `metrics`
    ///
    /// The error catalog and template store are loaded here, once, and
    /// shared read-only by all request handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation
    pub fn with_metrics(config: &Config, metrics: Arc<dyn MetricsSink>) -> anyhow::Result<Self> {
        config.validate()?;

        let renderer = Arc::new(ErrorPageRenderer::from_config(config));

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(handler::health_handler));
        }

        // Everything else is an error page request
        let mut app = app.fallback(handler::error_page_handler).with_state(renderer);

        // Apply middleware layers (innermost first)

        // Static response headers
        app = headers::apply(app, &config.server.headers);

        // Request metrics
        app = app.layer(axum::middleware::from_fn(move |req, next| {
            let sink = Arc::clone(&metrics);
            async move { metrics::metrics_middleware(sink, req, next).await }
        }));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address: config.server.listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
