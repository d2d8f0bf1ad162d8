#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use args::{Args, Command};
use clap::Parser;
use errdoc_config::Config;
use errdoc_core::{MetricsSink, NoopMetrics};
use errdoc_server::Server;
use errdoc_telemetry::OtelMetrics;
use tokio_util::sync::CancellationToken;

/// Exit code for a reachable server answering anything but `200`
const UNHEALTHY: u8 = 42;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Load configuration, then layer flags on top
    let mut config = Config::discover(args.config.as_deref())?;
    args.apply(&mut config);

    match &args.command {
        Some(Command::Health) => Ok(health(&config).await),
        Some(Command::Serve) | None => {
            serve(config, args.log_filter.as_deref()).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn serve(config: Config, log_filter: Option<&str>) -> anyhow::Result<()> {
    let log_filter = log_filter.unwrap_or_else(|| config.log_filter());
    let telemetry_guard = errdoc_telemetry::init(config.telemetry.as_ref(), log_filter)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        traces = telemetry_guard.exports_traces(),
        metrics = telemetry_guard.exports_metrics(),
        "starting errdoc"
    );

    let metrics: Arc<dyn MetricsSink> = if telemetry_guard.exports_metrics() {
        Arc::new(OtelMetrics::global())
    } else {
        Arc::new(NoopMetrics)
    };

    let server = Server::with_metrics(&config, metrics)?;

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    if let Err(e) = telemetry_guard.force_flush() {
        tracing::warn!(error = %e, "failed to flush metrics on shutdown");
    }

    tracing::info!("errdoc stopped");
    Ok(())
}

/// Probe the local health endpoint
///
/// Exits `0` on `200`, `1` when the server cannot be reached, and
/// [`UNHEALTHY`] for any other status.
async fn health(config: &Config) -> ExitCode {
    let url = health_url(config);

    let client = match reqwest::Client::builder().timeout(Duration::from_secs(5)).build() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("failed to build HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };

    match client.get(&url).send().await {
        Ok(response) if response.status() == reqwest::StatusCode::OK => ExitCode::SUCCESS,
        Ok(response) => {
            eprintln!("{url} responded with {}", response.status());
            ExitCode::from(UNHEALTHY)
        }
        Err(e) => {
            eprintln!("{url} is unreachable: {e}");
            ExitCode::FAILURE
        }
    }
}

fn health_url(config: &Config) -> String {
    let mut address = config.server.listen_address;
    if address.ip().is_unspecified() {
        address = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), address.port());
    }

    format!("http://{address}{}", config.server.health.path)
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
