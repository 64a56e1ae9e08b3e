//! Prometheus metrics for the interviewer backend
//!
//! Everything registers into the default registry; `GET /metrics` renders it.

use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram, register_histogram_vec, register_int_counter,
    CounterVec, Encoder, Histogram, HistogramVec, IntCounter, TextEncoder,
};

lazy_static! {
    // ─────────────────────────────────────────────────────────────────────────────
    // HTTP surface
    // ─────────────────────────────────────────────────────────────────────────────

    /// Requests served, by route and response status.
    pub static ref HTTP_REQUESTS: CounterVec = register_counter_vec!(
        "interviewer_http_requests_total",
        "HTTP requests served",
        &["endpoint", "status"]
    ).expect("failed to register HTTP_REQUESTS metric");

    /// Wall time per request, by route.
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "interviewer_http_request_duration_seconds",
        "HTTP request latency",
        &["endpoint"],
        vec![0.005, 0.05, 0.25, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]
    ).expect("failed to register HTTP_REQUEST_DURATION metric");

    /// Errors surfaced to callers, by kind.
    pub static ref ERRORS_TOTAL: CounterVec = register_counter_vec!(
        "interviewer_errors_total",
        "Errors returned to callers",
        &["kind"]
    ).expect("failed to register ERRORS_TOTAL metric");

    // ─────────────────────────────────────────────────────────────────────────────
    // Provider traffic
    // ─────────────────────────────────────────────────────────────────────────────

    /// API calls made to the model provider, by operation.
    pub static ref PROVIDER_CALLS: CounterVec = register_counter_vec!(
        "interviewer_provider_calls_total",
        "Calls made to the model provider",
        &["operation"]
    ).expect("failed to register PROVIDER_CALLS metric");

    /// Run status polls issued while waiting for a run to finish.
    pub static ref RUN_POLLS_TOTAL: IntCounter = register_int_counter!(
        "interviewer_run_polls_total",
        "Run status polls issued"
    ).expect("failed to register RUN_POLLS_TOTAL metric");

    /// Runs that reached a terminal state, by final status.
    pub static ref RUNS_TOTAL: CounterVec = register_counter_vec!(
        "interviewer_runs_total",
        "Provider runs by terminal status",
        &["status"]
    ).expect("failed to register RUNS_TOTAL metric");

    /// Time from run creation to terminal state.
    pub static ref RUN_DURATION: Histogram = register_histogram!(
        "interviewer_run_duration_seconds",
        "Time for a provider run to reach a terminal state",
        vec![0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0, 128.0]
    ).expect("failed to register RUN_DURATION metric");

    // ─────────────────────────────────────────────────────────────────────────────
    // Interview state
    // ─────────────────────────────────────────────────────────────────────────────

    /// Completed interview turns.
    pub static ref TURNS_TOTAL: IntCounter = register_int_counter!(
        "interviewer_turns_total",
        "Interview turns answered by the model"
    ).expect("failed to register TURNS_TOTAL metric");

    /// Session resets caused by (re)submitting configuration.
    pub static ref SESSION_RESETS_TOTAL: IntCounter = register_int_counter!(
        "interviewer_session_resets_total",
        "Interview sessions configured"
    ).expect("failed to register SESSION_RESETS_TOTAL metric");
}

/// Touch every metric so it shows up in the first scrape.
pub fn init() {
    lazy_static::initialize(&HTTP_REQUESTS);
    lazy_static::initialize(&HTTP_REQUEST_DURATION);
    lazy_static::initialize(&ERRORS_TOTAL);
    lazy_static::initialize(&PROVIDER_CALLS);
    lazy_static::initialize(&RUN_POLLS_TOTAL);
    lazy_static::initialize(&RUNS_TOTAL);
    lazy_static::initialize(&RUN_DURATION);
    lazy_static::initialize(&TURNS_TOTAL);
    lazy_static::initialize(&SESSION_RESETS_TOTAL);
}

/// Render the default registry in the Prometheus text format.
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
