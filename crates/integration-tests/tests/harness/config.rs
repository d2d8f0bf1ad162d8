//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use errdoc_config::{Config, HealthConfig, ServerConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: SocketAddr::from(([127, 0, 0, 1], 0)),
                    health: HealthConfig::default(),
                    ..ServerConfig::default()
                },
                ..Config::default()
            },
        }
    }

    /// Title passed to every page
    pub fn with_title(mut self, title: &str) -> Self {
        self.config.server.title = title.to_owned();
        self
    }

    /// Directory of override templates
    pub fn with_templates(mut self, dir: &Path) -> Self {
        self.config.templates.path = Some(dir.to_path_buf());
        self
    }

    /// Bind the JSON representation to another template
    pub fn with_json_template(mut self, name: &str) -> Self {
        self.config.templates.json = name.to_owned();
        self
    }

    /// Inline message override for `code`
    pub fn with_message(mut self, code: u16, message: &str) -> Self {
        self.config
            .errors
            .messages
            .insert(code.to_string(), toml::Value::from(message));
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Turn off every static response header group
    pub fn without_headers(mut self) -> Self {
        let headers = &mut self.config.server.headers;
        headers.no_cache = false;
        headers.secure = false;
        headers.options = false;
        headers.version = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
