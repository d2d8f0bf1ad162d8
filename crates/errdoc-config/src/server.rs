use std::net::SocketAddr;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    /// Static title passed to every rendered page
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub headers: HeadersConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            title: String::new(),
            health: HealthConfig::default(),
            headers: HeadersConfig::default(),
        }
    }
}

/// Liveness route, answered before any error page handling
///
/// Also the target of the `health` subcommand.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/healthz".to_owned(),
        }
    }
}

/// Toggles for the static response headers added to every response
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeadersConfig {
    /// `Cache-Control`, `Expires` and `Last-Modified` headers that disable caching
    pub no_cache: bool,
    /// Wildcard CORS origin plus frame, sniffing and XSS protection headers
    pub secure: bool,
    /// Answer OPTIONS requests with `200` and the allowed methods
    pub options: bool,
    /// `X-Errdoc-Version` header
    pub version: bool,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            no_cache: true,
            secure: true,
            options: true,
            version: true,
        }
    }
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}
