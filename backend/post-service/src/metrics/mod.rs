//! Prometheus metrics for post-service.
//!
//! Exposes lifecycle/feed collectors and an HTTP handler for the `/metrics`
//! endpoint.

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

static POSTS_SUBMITTED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "post_service_posts_submitted_total",
        "Posts accepted by the lifecycle manager, by outcome",
        &["outcome"]
    )
    .expect("register posts_submitted counter")
});

static FEED_REQUESTS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "post_service_feed_requests_total",
        "Feed pages served"
    )
    .expect("register feed_requests counter")
});

pub fn record_submit(replaced: bool) {
    let outcome = if replaced { "replaced" } else { "created" };
    POSTS_SUBMITTED.with_label_values(&[outcome]).inc();
}

pub fn record_feed_request() {
    FEED_REQUESTS.inc();
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
