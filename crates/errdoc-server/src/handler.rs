use std::sync::Arc;

use axum::extract::{Request, State};
use axum::response::{IntoResponse, Response};
use errdoc_core::{ErrorPage, ErrorPageRenderer, Representation};
use http::{HeaderName, StatusCode};
use http::header::CONTENT_TYPE;

/// Keeps error documents out of search indexes
const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

/// Serve the error document requested by any unmatched request
pub async fn error_page_handler(State(renderer): State<Arc<ErrorPageRenderer>>, request: Request) -> Response {
    let (parts, _body) = request.into_parts();

    page_response(renderer.render(&parts))
}

fn page_response(page: ErrorPage) -> Response {
    (
        page.status,
        [(CONTENT_TYPE, page.content_type), (X_ROBOTS_TAG, "noindex")],
        page.body,
    )
        .into_response()
}

/// Liveness probe; answers as long as the process can serve requests
pub async fn health_handler() -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, Representation::PlainText.content_type())],
        "OK",
    )
        .into_response()
}
