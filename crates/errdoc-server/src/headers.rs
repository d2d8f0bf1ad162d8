use axum::Router;
use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use errdoc_config::HeadersConfig;
use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW, CACHE_CONTROL,
    EXPIRES, LAST_MODIFIED, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS, X_XSS_PROTECTION,
};
use http::{HeaderName, HeaderValue, Method, StatusCode};
use tower_http::set_header::SetResponseHeaderLayer;

const VERSION_HEADER: HeaderName = HeaderName::from_static("x-errdoc-version");

/// RFC 9110 `IMF-fixdate`
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Apply the configured response headers to every route
///
/// The OPTIONS responder sits innermost so its replies carry the static
/// headers too.
pub fn apply(router: Router, config: &HeadersConfig) -> Router {
    let mut router = router;

    if config.options {
        router = router.layer(axum::middleware::from_fn(options_middleware));
    }

    let mut headers: Vec<(HeaderName, HeaderValue)> = Vec::new();

    if config.no_cache {
        headers.push((
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, max-age=0, must-revalidate"),
        ));
        headers.push((EXPIRES, HeaderValue::from_static("Thu, 01 Jan 1970 00:00:00 GMT")));
        router = router.layer(SetResponseHeaderLayer::overriding(LAST_MODIFIED, |_: &Response| {
            HeaderValue::from_str(&jiff::Timestamp::now().strftime(HTTP_DATE_FORMAT).to_string()).ok()
        }));
    }

    if config.secure {
        headers.push((ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")));
        headers.push((X_FRAME_OPTIONS, HeaderValue::from_static("DENY")));
        headers.push((X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")));
        headers.push((X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")));
    }

    if config.version {
        headers.push((VERSION_HEADER, HeaderValue::from_static(env!("CARGO_PKG_VERSION"))));
    }

    headers.into_iter().fold(router, |router, (name, value)| {
        router.layer(SetResponseHeaderLayer::overriding(name, value))
    })
}

/// Answer every OPTIONS request with `200` and the allowed methods
async fn options_middleware(request: Request, next: Next) -> Response {
    if request.method() != Method::OPTIONS {
        return next.run(request).await;
    }

    (
        StatusCode::OK,
        [
            (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, PUT, PATCH, DELETE, OPTIONS"),
            (ACCESS_CONTROL_ALLOW_HEADERS, "authorization, origin, content-type, accept"),
            (ALLOW, "HEAD, GET, POST, PUT, PATCH, DELETE, OPTIONS"),
        ],
        Body::empty(),
    )
        .into_response()
}
