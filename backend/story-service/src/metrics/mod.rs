//! Prometheus metrics for story-service.
//!
//! Exposes HTTP and story collectors and an HTTP handler for the `/metrics` endpoint.

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, Encoder, HistogramVec, TextEncoder};
use std::time::Duration;

pub mod stories;

static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "story_http_request_duration_seconds",
        "HTTP request latency by method and status",
        &["method", "status"],
        vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("failed to register story_http_request_duration_seconds")
});

pub fn record_http_request(method: &str, status: u16, duration: Duration) {
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, &status.to_string()])
        .observe(duration.as_secs_f64());
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
