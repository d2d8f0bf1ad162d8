use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use errdoc_config::Config;

/// Render HTTP error documents for reverse proxies
#[derive(Debug, Parser)]
#[command(name = "errdoc", version, about = "Serve rendered HTTP error documents")]
pub struct Args {
    /// Path to configuration file (defaults to `errdoc.toml` when present)
    #[arg(short, long, env = "ERRDOC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the listen address
    #[arg(long, env = "ERRDOC_LISTEN", global = true)]
    pub listen: Option<SocketAddr>,

    /// Override the log filter (e.g. `debug`, `errdoc_core=trace`)
    #[arg(long, env = "ERRDOC_LOG", global = true)]
    pub log_filter: Option<String>,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the error page server (default)
    Serve,
    /// Probe the health endpoint of a running server
    Health,
}

/// Page content overrides, accepted with or without the `serve` subcommand
#[derive(Debug, Default, clap::Args)]
pub struct ServeArgs {
    /// Title passed to every rendered page
    #[arg(long, env = "ERRDOC_TITLE", global = true)]
    pub title: Option<String>,

    /// Directory of templates overriding the bundled ones
    #[arg(long, env = "ERRDOC_TEMPLATES_PATH", global = true)]
    pub templates_path: Option<PathBuf>,

    /// File of `code = "message"` overrides
    #[arg(long, env = "ERRDOC_ERRORS_PATH", global = true)]
    pub errors_path: Option<PathBuf>,
}

impl Args {
    /// Apply command line overrides on top of the file configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(listen) = self.listen {
            config.server.listen_address = listen;
        }

        // Serving is the default, so only the probe skips page overrides
        if !matches!(self.command, Some(Command::Health)) {
            self.serve.apply(config);
        }
    }
}

impl ServeArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(ref title) = self.title {
            config.server.title.clone_from(title);
        }
        if let Some(ref path) = self.templates_path {
            config.templates.path = Some(path.clone());
        }
        if let Some(ref path) = self.errors_path {
            config.errors.path = Some(path.clone());
        }
    }
}
