//! Integration tests for the HTTP API

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use voice_coach_config::Settings;
use voice_coach_core::{Activity, ExtractedRecord, Intensity};
use voice_coach_llm::{AgentGateway, ScriptedCoach};
use voice_coach_server::{create_router, AppState};

fn state() -> AppState {
    let mut settings = Settings::default();
    settings.gateway.agent_id = Some("agent-123".to_string());
    AppState::new(settings).with_gateway(Some(Arc::new(AgentGateway::new(Arc::new(
        ScriptedCoach::new(),
    )))))
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_extract_endpoint() {
    let app = create_router(state());
    let request = Request::builder()
        .method("POST")
        .uri("/api/records/extract")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"transcript":"Swim for 40 minutes, pretty intense"}"#))
        .unwrap();

    let (status, body) = call(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["workout_data"]["activity"], "swimming");
    assert_eq!(body["workout_data"]["duration"], 40);
    assert_eq!(body["workout_data"]["difficulty"], "hard");
}

#[tokio::test]
async fn test_extract_endpoint_nothing_found() {
    let app = create_router(state());
    let request = Request::builder()
        .method("POST")
        .uri("/api/records/extract")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"transcript":"good morning"}"#))
        .unwrap();

    let (status, body) = call(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"].is_string());
}

/// Records are served from the sink even when no session is registered
#[tokio::test]
async fn test_record_endpoint() {
    let state = state();
    let record = ExtractedRecord::new(Activity::Cycling, 60, Some(Intensity::Easy)).unwrap();
    state.registry.save_record("finished", &record).await;

    let (status, body) = call(
        create_router(state.clone()),
        get("/api/conversations/finished/record"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["conversation_id"], "finished");
    assert_eq!(body["workout_data"]["activity"], "cycling");
    assert_eq!(body["workout_data"]["difficulty"], "easy");

    let (status, _) = call(create_router(state), get("/api/conversations/unknown/record")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_client_config() {
    let (status, body) = call(create_router(state()), get("/api/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent_id"], "agent-123");
    assert_eq!(body["ws_url"], "/ws/conversation");

    let mut settings = Settings::default();
    settings.gateway.agent_id = None;
    let (status, _) = call(create_router(AppState::new(settings)), get("/api/config")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_health_and_sessions() {
    let state = state();
    state.registry.create("s1").unwrap();

    let (status, body) = call(create_router(state.clone()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["sessions"]["count"], 1);
    assert_eq!(body["checks"]["gateway"]["agent"], "scripted");

    let (status, body) = call(create_router(state), get("/api/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn test_health_degraded_without_gateway() {
    let (status, body) =
        call(create_router(state().with_gateway(None)), get("/health")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
}
