//! Prometheus metrics.
//!
//! HTTP request metrics come from [`metrics_middleware`]; the `record_*`
//! helpers count business events from the route handlers and job runs from
//! the scheduler.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Records `http_requests_total` and `http_request_duration_seconds`,
/// labelled by the matched route rather than the raw path.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => status
    )
    .increment(1);
    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(start.elapsed().as_secs_f64());

    response
}

fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::PATCH => "PATCH",
        Method::HEAD => "HEAD",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

pub fn record_interest_toggled(added: bool) {
    let outcome = if added { "added" } else { "removed" };
    counter!("interests_toggled_total", "outcome" => outcome).increment(1);
}

pub fn record_action_item_created() {
    counter!("action_items_created_total").increment(1);
}

pub fn record_action_item_transition(status: &'static str) {
    counter!("action_item_transitions_total", "status" => status).increment(1);
}

pub fn record_action_items_expired(count: u64) {
    counter!("action_items_expired_total").increment(count);
}

/// Counts one background job run and records its duration.
pub fn record_job_run(job: &'static str, succeeded: bool, duration_secs: f64) {
    let result = if succeeded { "ok" } else { "error" };
    counter!("background_job_runs_total", "job" => job, "result" => result).increment(1);
    histogram!("background_job_duration_seconds", "job" => job).record(duration_secs);
}

pub fn record_chat_created(source: &'static str) {
    counter!("chats_created_total", "source" => source).increment(1);
}

pub fn record_message_sent() {
    counter!("chat_messages_sent_total").increment(1);
}

/// Serves the Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Installs the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    // a concurrent initializer may have won; its handle serves the same data
    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}
