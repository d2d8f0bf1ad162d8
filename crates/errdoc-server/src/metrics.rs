use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use errdoc_core::{MetricsSink, protocol_label};

/// Report every completed request to the metrics sink
pub async fn metrics_middleware(sink: Arc<dyn MetricsSink>, request: Request, next: Next) -> Response {
    let start = Instant::now();
    let protocol = protocol_label(request.version());

    let response = next.run(request).await;

    sink.record(protocol, start.elapsed());

    response
}
