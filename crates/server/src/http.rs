//! HTTP Endpoints
//!
//! REST API alongside the conversation WebSocket.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use voice_coach_core::ExtractedRecord;

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::websocket::WebSocketHandler;
use crate::ServerError;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let ws_path = config.server.ws_path.clone();
    drop(config); // Release lock before building router

    Router::new()
        // Conversation WebSocket
        .route(&ws_path, get(WebSocketHandler::handle))
        // Records
        .route("/api/conversations/:id/record", get(get_record))
        .route("/api/records/extract", post(extract_record))
        // Sessions
        .route("/api/sessions", get(list_sessions))
        // Client bootstrap
        .route("/api/config", get(client_config))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer),
        )
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let mut parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to {}", DEFAULT_ORIGIN);
        parsed_origins.push(HeaderValue::from_static(DEFAULT_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Serialize)]
struct RecordResponse {
    conversation_id: String,
    workout_data: ExtractedRecord,
}

/// Latest record for a conversation, live or finished
async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecordResponse>, StatusCode> {
    let record = state
        .registry
        .last_record(&id)
        .await
        .ok_or_else(|| ServerError::NotFound(format!("No workout data for conversation {}", id)))?;

    Ok(Json(RecordResponse {
        conversation_id: id,
        workout_data: record,
    }))
}

#[derive(Debug, Deserialize)]
struct ExtractRequest {
    transcript: String,
}

#[derive(Debug, Serialize)]
struct ExtractResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    workout_data: Option<ExtractedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Run the extractor on a posted transcript
async fn extract_record(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Json<ExtractResponse> {
    match state.extractor.extract(&request.transcript) {
        Some(record) => Json(ExtractResponse {
            success: true,
            workout_data: Some(record),
            message: None,
        }),
        None => Json(ExtractResponse {
            success: false,
            workout_data: None,
            message: Some("Could not extract workout data from transcript".to_string()),
        }),
    }
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.registry.summaries();
    Json(serde_json::json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
}

/// Connection details for clients
async fn client_config(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StatusCode> {
    let config = state.get_config();
    let agent_id = config
        .gateway
        .agent_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ServerError::Configuration("AGENT_ID not configured".to_string()))?;

    Ok(Json(serde_json::json!({
        "agent_id": agent_id,
        "ws_url": config.server.ws_path,
        "backend_url": config.server.backend_url,
    })))
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let gateway_ready = state.gateway.is_some();
    let status_code = if gateway_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if gateway_ready { "healthy" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "checks": {
                "gateway": {
                    "status": if gateway_ready { "ok" } else { "not_configured" },
                    "agent": state.gateway.as_ref().map(|g| g.agent_name().to_string()),
                    "synthesis": state.gateway.as_ref().is_some_and(|g| g.has_synthesizer()),
                },
                "sessions": {
                    "status": "ok",
                    "count": state.registry.count(),
                },
                "records": {
                    "status": "ok",
                    "durable": state.registry.is_durable(),
                },
            },
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_builds_for_all_inputs() {
        let _ = build_cors_layer(&[], true);
        let _ = build_cors_layer(&["https://coach.example".to_string()], true);
        let _ = build_cors_layer(&["bad\norigin".to_string()], true);
        let _ = build_cors_layer(&[], false);
    }

    #[test]
    fn test_extract_response_shape() {
        let failure = ExtractResponse {
            success: false,
            workout_data: None,
            message: Some("Could not extract workout data from transcript".to_string()),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("workout_data").is_none());
    }
}
