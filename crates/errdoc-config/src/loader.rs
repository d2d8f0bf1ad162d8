use std::path::Path;

use crate::Config;

/// Config file consulted when no path is given explicitly
pub const DEFAULT_CONFIG_PATH: &str = "errdoc.toml";

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails,
    /// or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    ///
    /// Returns an error if TOML parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when given, otherwise from [`DEFAULT_CONFIG_PATH`]
    ///
    /// The service runs without any file at all, so a missing default file
    /// yields the default configuration. An explicit path must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file fails to load
    pub fn discover(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.is_file() {
            return Self::load(default_path);
        }

        tracing::debug!(path = DEFAULT_CONFIG_PATH, "no config file found, using defaults");
        Ok(Self::default())
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the health path or template bindings are
    /// unusable, or telemetry settings are out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_health()?;
        self.validate_templates()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_health(&self) -> anyhow::Result<()> {
        let health = &self.server.health;

        if health.enabled && !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/', got '{}'", health.path);
        }

        Ok(())
    }

    fn validate_templates(&self) -> anyhow::Result<()> {
        let bindings = [
            ("json", &self.templates.json),
            ("html", &self.templates.html),
            ("plain_text", &self.templates.plain_text),
        ];

        for (key, name) in bindings {
            if name.trim().is_empty() {
                anyhow::bail!("templates.{key} must name a template");
            }
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        if let Some(ref telemetry) = self.telemetry
            && let Some(ref tracing) = telemetry.tracing
            && !(0.0..=1.0).contains(&tracing.sampling_rate)
        {
            anyhow::bail!(
                "telemetry.tracing.sampling_rate must be between 0.0 and 1.0, got {}",
                tracing.sampling_rate
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::SocketAddr;

    use super::*;
    use crate::telemetry::ExportProtocol;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.listen_address, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(config.server.title.is_empty());
        assert!(config.server.health.enabled);
        assert_eq!(config.server.health.path, "/healthz");
        assert!(config.server.headers.no_cache);
        assert!(config.errors.path.is_none());
        assert!(config.errors.messages.is_empty());
        assert_eq!(config.templates.json, "json.tmpl");
        assert_eq!(config.templates.html, "html.tmpl");
        assert_eq!(config.templates.plain_text, "html.tmpl");
        assert!(config.telemetry.is_none());
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn full_config_parses() {
        let raw = r#"
            [server]
            listen_address = "127.0.0.1:9000"
            title = "Example Inc."

            [server.health]
            path = "/ready"

            [server.headers]
            version = false

            [errors]
            path = "/etc/errdoc/errors.toml"

            [errors.messages]
            404 = "Nothing to see here"
            503 = "Back soon"

            [templates]
            path = "/etc/errdoc/templates"
            plain_text = "text.tmpl"

            [telemetry]
            log_filter = "debug"

            [telemetry.exporter]
            endpoint = "http://localhost:4317"
            protocol = "http_proto"
        "#;

        let config = Config::parse(raw).unwrap();

        assert_eq!(config.server.listen_address, SocketAddr::from(([127, 0, 0, 1], 9000)));
        assert_eq!(config.server.title, "Example Inc.");
        assert_eq!(config.server.health.path, "/ready");
        assert!(!config.server.headers.version);
        assert!(config.server.headers.secure);
        assert_eq!(config.errors.messages.len(), 2);
        assert_eq!(
            config.errors.messages.get("404").and_then(toml::Value::as_str),
            Some("Nothing to see here")
        );
        assert_eq!(config.templates.plain_text, "text.tmpl");
        assert_eq!(config.templates.json, "json.tmpl");

        let telemetry = config.telemetry.as_ref().unwrap();
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(telemetry.service_name, "errdoc");
        assert_eq!(telemetry.exporter.as_ref().unwrap().protocol, ExportProtocol::HttpProto);
    }

    #[test]
    fn malformed_messages_do_not_fail_parsing() {
        let raw = r#"
            [errors.messages]
            404 = "Not here"
            teapot = "short and stout"
            500 = 42
        "#;

        let config = Config::parse(raw).unwrap();
        assert_eq!(config.errors.messages.len(), 3);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::parse("[server]\nport = 8080").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn relative_health_path_is_rejected() {
        let err = Config::parse("[server.health]\npath = \"healthz\"").unwrap_err();
        assert!(err.to_string().contains("must start with '/'"));
    }

    #[test]
    fn disabled_health_skips_path_check() {
        assert!(Config::parse("[server.health]\nenabled = false\npath = \"\"").is_ok());
    }

    #[test]
    fn empty_template_binding_is_rejected() {
        let err = Config::parse("[templates]\njson = \"  \"").unwrap_err();
        assert!(err.to_string().contains("templates.json"));
    }

    #[test]
    fn sampling_rate_out_of_range_is_rejected() {
        let err = Config::parse("[telemetry.tracing]\nsampling_rate = 1.5").unwrap_err();
        assert!(err.to_string().contains("sampling_rate"));
    }

    #[test]
    fn metrics_can_be_switched_off() {
        let raw = r#"
            [telemetry.exporter]
            endpoint = "http://localhost:4317"

            [telemetry.metrics]
            enabled = false
        "#;

        let config = Config::parse(raw).unwrap();
        let telemetry = config.telemetry.as_ref().unwrap();

        assert!(telemetry.metrics_exporter().is_none());
        assert!(telemetry.trace_exporter().is_some());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\ntitle = \"From disk\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.title, "From disk");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        let err = Config::discover(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
