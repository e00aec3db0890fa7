//! Health, middleware and fallback behaviour.

mod common;

use axum::http::{Request, StatusCode};
use axum::body::Body;
use common::{get_request, parse_response_body, TestApp};

#[tokio::test]
async fn test_liveness_and_readiness() {
    let app = TestApp::new();

    let response = app.send(get_request("/api/health/live")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["status"], "alive");

    let response = app.send(get_request("/api/health/ready")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_response_body(response).await["status"], "ready");
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = TestApp::new();

    let response = app.send(get_request("/api/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["store"]["connected"], true);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();

    let request = Request::builder()
        .uri("/api/health/live")
        .header("x-request-id", "trace-me-42")
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "trace-me-42"
    );

    let response = app.send(get_request("/api/health/live")).await;
    let generated = response.headers().get("x-request-id").unwrap();
    assert_eq!(generated.to_str().unwrap().len(), 36);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = TestApp::new();

    let response = app.send(get_request("/api/health/live")).await;
    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.get("strict-transport-security").is_none());
}

#[tokio::test]
async fn test_hsts_when_enabled() {
    let mut config = common::test_config();
    config.security.hsts_enabled = true;
    let app = TestApp::with_config(config);

    let response = app.send(get_request("/api/health/live")).await;
    assert!(response
        .headers()
        .get("strict-transport-security")
        .is_some());
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = TestApp::new();

    let response = app.send(get_request("/api/v1/nope")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
