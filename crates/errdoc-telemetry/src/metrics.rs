//! OpenTelemetry-backed request metrics

use std::time::Duration;

use errdoc_core::MetricsSink;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram, Meter};

pub const HTTP_REQUEST_COUNT: &str = "http.server.request.count";
pub const HTTP_REQUEST_DURATION: &str = "http.server.request.duration";

/// Attribute carrying the `major.minor` protocol version
const PROTOCOL_ATTRIBUTE: &str = "network.protocol.version";

/// Request counter and duration histogram
#[derive(Clone)]
pub struct OtelMetrics {
    requests: Counter<u64>,
    duration: Histogram<f64>,
}

impl OtelMetrics {
    pub fn new(meter: &Meter) -> Self {
        let requests = meter
            .u64_counter(HTTP_REQUEST_COUNT)
            .with_description("Number of error page requests served")
            .build();

        let duration = meter
            .f64_histogram(HTTP_REQUEST_DURATION)
            .with_description("Time taken to serve an error page request")
            .with_unit("s")
            .build();

        Self { requests, duration }
    }

    /// Instruments registered on the global meter provider
    pub fn global() -> Self {
        Self::new(&opentelemetry::global::meter("errdoc"))
    }
}

impl MetricsSink for OtelMetrics {
    fn record(&self, protocol: &str, elapsed: Duration) {
        let attributes = [KeyValue::new(PROTOCOL_ATTRIBUTE, protocol.to_owned())];

        self.requests.add(1, &attributes);
        self.duration.record(elapsed.as_secs_f64(), &attributes);
    }
}
