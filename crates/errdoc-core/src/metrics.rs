//! Request metrics seam
//!
//! The serving layer reports one observation per completed request through
//! an injected [`MetricsSink`]. Implementations must not block and cannot
//! fail the request.

use std::time::Duration;

use http::Version;

/// Receiver of per-request observations
pub trait MetricsSink: Send + Sync {
    /// Count one request served over `protocol` and observe its duration
    fn record(&self, protocol: &str, elapsed: Duration);
}

/// Sink that drops every observation
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record(&self, _protocol: &str, _elapsed: Duration) {}
}

/// `major.minor` label for an HTTP version
pub fn protocol_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2.0",
        Version::HTTP_3 => "3.0",
        _ => "1.1",
    }
}
