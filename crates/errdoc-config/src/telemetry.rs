use std::collections::HashMap;

use serde::Deserialize;
use url::Url;

/// Telemetry configuration
///
/// Logging is always on. Traces and request metrics are exported over OTLP
/// only when an exporter is configured, either shared through `exporter` or
/// per signal.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    /// `service.name` resource attribute
    pub service_name: String,
    /// `tracing-subscriber` filter directive
    pub log_filter: String,
    /// Additional resource attributes
    pub resource_attributes: HashMap<String, String>,
    /// Exporter shared by tracing and metrics
    pub exporter: Option<ExporterConfig>,
    pub tracing: Option<TracingConfig>,
    pub metrics: Option<MetricsConfig>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "errdoc".to_owned(),
            log_filter: "info".to_owned(),
            resource_attributes: HashMap::new(),
            exporter: None,
            tracing: None,
            metrics: None,
        }
    }
}

impl TelemetryConfig {
    /// Exporter for spans, if trace export is on
    pub fn trace_exporter(&self) -> Option<&ExporterConfig> {
        self.tracing
            .as_ref()
            .and_then(|t| t.exporter.as_ref())
            .or(self.exporter.as_ref())
    }

    /// Exporter for request metrics, if metric export is on
    pub fn metrics_exporter(&self) -> Option<&ExporterConfig> {
        match self.metrics {
            Some(MetricsConfig { enabled: false, .. }) => None,
            Some(MetricsConfig {
                exporter: Some(ref exporter),
                ..
            }) => Some(exporter),
            _ => self.exporter.as_ref(),
        }
    }
}

/// Span export settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TracingConfig {
    /// Fraction of root spans kept, `0.0..=1.0`
    pub sampling_rate: f64,
    /// Follow the sampling decision of an incoming parent span
    pub parent_based: bool,
    pub exporter: Option<ExporterConfig>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 1.0,
            parent_based: true,
            exporter: None,
        }
    }
}

/// Request metric export settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    /// Set to `false` to export traces without request metrics
    pub enabled: bool,
    pub exporter: Option<ExporterConfig>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exporter: None,
        }
    }
}

/// Where and how one OTLP pipeline ships its data
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExporterConfig {
    pub endpoint: Url,
    #[serde(default)]
    pub protocol: ExportProtocol,
    #[serde(default)]
    pub batch: Option<BatchConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportProtocol {
    #[default]
    Grpc,
    HttpProto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Seconds between metric exports
    pub scheduled_delay: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { scheduled_delay: 30 }
    }
}
