//! Prometheus metrics
//!
//! The gateway crate records agent and synthesis latency through the same
//! global recorder; this module owns the recorder and the session-level
//! counters.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

pub const SESSIONS_OPENED_TOTAL: &str = "voice_coach_sessions_opened_total";
pub const SESSIONS_CLOSED_TOTAL: &str = "voice_coach_sessions_closed_total";
/// Gauge
pub const SESSIONS_ACTIVE: &str = "voice_coach_sessions_active";
pub const RECORDS_EXTRACTED_TOTAL: &str = "voice_coach_records_extracted_total";
/// Labels: queue (input, output)
pub const AUDIO_CHUNKS_DROPPED_TOTAL: &str = "voice_coach_audio_chunks_dropped_total";
/// Labels: reason
pub const PROTOCOL_ERRORS_TOTAL: &str = "voice_coach_protocol_errors_total";

/// Install the global Prometheus recorder
///
/// Returns `None` if a recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            tracing::info!("Prometheus metrics recorder installed");
            Some(handle)
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install metrics recorder");
            None
        },
    }
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

pub fn record_session_opened(active: usize) {
    metrics::counter!(SESSIONS_OPENED_TOTAL).increment(1);
    metrics::gauge!(SESSIONS_ACTIVE).set(active as f64);
}

pub fn record_session_closed(active: usize) {
    metrics::counter!(SESSIONS_CLOSED_TOTAL).increment(1);
    metrics::gauge!(SESSIONS_ACTIVE).set(active as f64);
}

pub fn record_extraction() {
    metrics::counter!(RECORDS_EXTRACTED_TOTAL).increment(1);
}

pub fn record_audio_dropped(queue: &'static str) {
    metrics::counter!(AUDIO_CHUNKS_DROPPED_TOTAL, "queue" => queue).increment(1);
}

pub fn record_protocol_error(reason: &'static str) {
    metrics::counter!(PROTOCOL_ERRORS_TOTAL, "reason" => reason).increment(1);
}
