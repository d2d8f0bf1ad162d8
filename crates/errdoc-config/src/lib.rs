#![allow(clippy::must_use_candidate)]

pub mod errors;
mod loader;
pub mod server;
pub mod telemetry;
pub mod templates;

use serde::Deserialize;

pub use errors::*;
pub use loader::DEFAULT_CONFIG_PATH;
pub use server::*;
pub use telemetry::TelemetryConfig;
pub use templates::*;

/// Top-level errdoc configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Error message overrides
    #[serde(default)]
    pub errors: ErrorsConfig,
    /// Template overrides and representation bindings
    #[serde(default)]
    pub templates: TemplatesConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}

impl Config {
    /// Log filter directive, `info` unless telemetry overrides it
    pub fn log_filter(&self) -> &str {
        self.telemetry.as_ref().map_or("info", |t| t.log_filter.as_str())
    }
}
