mod harness;

use std::sync::Arc;

use harness::config::ConfigBuilder;
use harness::server::{CountingMetrics, TestServer};

// -- Static headers --

#[tokio::test]
async fn default_headers_are_set() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.client().get(server.url("/500")).send().await.unwrap();
    let headers = resp.headers();

    assert_eq!(headers["cache-control"], "no-cache, no-store, max-age=0, must-revalidate");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-robots-tag"], "noindex");
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers["last-modified"].to_str().unwrap().ends_with(" GMT"));
    assert!(headers.contains_key("x-errdoc-version"));
}

#[tokio::test]
async fn headers_can_be_disabled() {
    let server = TestServer::start(ConfigBuilder::new().without_headers().build())
        .await
        .unwrap();

    let resp = server.client().get(server.url("/500")).send().await.unwrap();
    let headers = resp.headers();

    assert!(headers.get("cache-control").is_none());
    assert!(headers.get("last-modified").is_none());
    assert!(headers.get("access-control-allow-origin").is_none());
    assert!(headers.get("x-frame-options").is_none());
    assert!(headers.get("x-errdoc-version").is_none());
}

#[tokio::test]
async fn health_responses_carry_headers_too() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server.client().get(server.url("/healthz")).send().await.unwrap();
    assert!(resp.headers().contains_key("cache-control"));
}

// -- OPTIONS --

#[tokio::test]
async fn options_requests_are_answered_directly() {
    let server = TestServer::start(ConfigBuilder::new().build()).await.unwrap();

    let resp = server
        .client()
        .request(reqwest::Method::OPTIONS, server.url("/503.html"))
        .send()
        .await
        .unwrap();
    let headers = resp.headers().clone();

    assert_eq!(resp.status(), 200);
    assert_eq!(headers["allow"], "HEAD, GET, POST, PUT, PATCH, DELETE, OPTIONS");
    assert_eq!(headers["access-control-allow-methods"], "GET, POST, PUT, PATCH, DELETE, OPTIONS");
    assert_eq!(headers["access-control-allow-headers"], "authorization, origin, content-type, accept");
    assert_eq!(headers["access-control-allow-origin"], "*");
    assert!(headers.contains_key("cache-control"));
    assert!(resp.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn options_render_error_page_when_disabled() {
    let server = TestServer::start(ConfigBuilder::new().without_headers().build())
        .await
        .unwrap();

    let resp = server
        .client()
        .request(reqwest::Method::OPTIONS, server.url("/503.html"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 503);
    assert!(resp.headers().get("allow").is_none());
}

// -- Metrics --

#[tokio::test]
async fn every_request_is_recorded() {
    let metrics = Arc::new(CountingMetrics::default());
    let server = TestServer::start_with_metrics(ConfigBuilder::new().build(), metrics.clone())
        .await
        .unwrap();

    for path in ["/404", "/500.json", "/healthz"] {
        server.client().get(server.url(path)).send().await.unwrap();
    }

    assert_eq!(metrics.total(), 3);
    assert_eq!(metrics.http11(), 3);
}

#[tokio::test]
async fn failed_renders_are_still_recorded() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("html.tmpl"), "{{ nope }}").unwrap();

    let metrics = Arc::new(CountingMetrics::default());
    let config = ConfigBuilder::new().with_templates(dir.path()).build();
    let server = TestServer::start_with_metrics(config, metrics.clone()).await.unwrap();

    let resp = server.client().get(server.url("/404")).send().await.unwrap();

    assert_eq!(resp.status(), 500);
    assert_eq!(metrics.total(), 1);
}
