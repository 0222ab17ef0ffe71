//! Prometheus metrics for invoice-editor.

use super::catalog_client::CatalogError;
use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_int_gauge, CounterVec, IntGauge, TextEncoder};

/// Totals computations by entry point and outcome.
pub static TOTALS_COMPUTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_editor_totals_computed_total",
        "Total number of invoice totals computations",
        &["source", "outcome"] // outcome: ok, invalid
    )
    .expect("Failed to register totals_computed_total")
});

/// Session events by type and outcome.
pub static SESSION_EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_editor_session_events_total",
        "Total number of invoice session events",
        &["event", "outcome"]
    )
    .expect("Failed to register session_events_total")
});

/// Catalog requests by endpoint and outcome.
pub static CATALOG_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "invoice_editor_catalog_requests_total",
        "Total number of catalog search requests",
        &["endpoint", "outcome"]
    )
    .expect("Failed to register catalog_requests_total")
});

/// Sessions currently held in memory.
pub static ACTIVE_SESSIONS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "invoice_editor_active_sessions",
        "Number of invoice sessions held in memory"
    )
    .expect("Failed to register active_sessions")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&TOTALS_COMPUTED_TOTAL);
    Lazy::force(&SESSION_EVENTS_TOTAL);
    Lazy::force(&CATALOG_REQUESTS_TOTAL);
    Lazy::force(&ACTIVE_SESSIONS);
}

pub fn record_totals(source: &str, ok: bool) {
    let outcome = if ok { "ok" } else { "invalid" };
    TOTALS_COMPUTED_TOTAL
        .with_label_values(&[source, outcome])
        .inc();
}

pub fn record_session_event(event: &str, outcome: &str) {
    SESSION_EVENTS_TOTAL
        .with_label_values(&[event, outcome])
        .inc();
}

pub fn record_catalog_request<T>(endpoint: &str, result: &Result<T, CatalogError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(CatalogError::NotConfigured) => "not_configured",
        Err(CatalogError::Request(_)) => "request_error",
        Err(CatalogError::Status(_)) => "status_error",
        Err(CatalogError::Decode(_)) => "decode_error",
    };
    CATALOG_REQUESTS_TOTAL
        .with_label_values(&[endpoint, outcome])
        .inc();
}

pub fn set_active_sessions(count: usize) {
    ACTIVE_SESSIONS.set(i64::try_from(count).unwrap_or(i64::MAX));
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
