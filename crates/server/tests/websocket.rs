//! End-to-end tests using a real WebSocket client against the router

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

use voice_coach_config::Settings;
use voice_coach_llm::{factory::MISSING_CREDENTIALS, AgentGateway, ScriptedCoach};
use voice_coach_server::{create_router, AppState};

const TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

fn state() -> AppState {
    AppState::new(Settings::default()).with_gateway(Some(Arc::new(AgentGateway::new(Arc::new(
        ScriptedCoach::new(),
    )))))
}

/// Serve the router on an ephemeral port and return the conversation URL
async fn boot_server(state: AppState) -> String {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("ws://{addr}/ws/conversation")
}

async fn connect(url: &str) -> WsStream {
    let (ws, _) = connect_async(url).await.unwrap();
    ws
}

/// Read the next text message as JSON
async fn read_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = timeout(TIMEOUT, ws.next())
            .await
            .expect("timeout waiting for message")
            .expect("stream closed")
            .expect("ws error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn send_json(ws: &mut WsStream, value: Value) {
    ws.send(Message::Text(value.to_string().into())).await.unwrap();
}

/// Connect and return the conversation id from the `connected` frame
async fn open(ws: &mut WsStream) -> String {
    let connected = read_json(ws).await;
    assert_eq!(connected["type"], "connected");
    assert_eq!(connected["status"], "ready");
    connected["conversation_id"].as_str().unwrap().to_string()
}

async fn wait_for_removal(state: &AppState, id: &str) {
    timeout(TIMEOUT, async {
        while state.registry.get(id).is_some() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session was not removed");
}

#[tokio::test]
async fn test_conversation_over_websocket() {
    let state = state();
    let url = boot_server(state.clone()).await;
    let mut ws = connect(&url).await;
    let id = open(&mut ws).await;
    assert!(state.registry.get(&id).is_some());

    send_json(&mut ws, json!({"type": "start"})).await;
    let started = read_json(&mut ws).await;
    assert_eq!(started["type"], "started");
    assert_eq!(started["conversation_id"], id.as_str());

    send_json(&mut ws, json!({"type": "transcript", "text": "I ran 30 minutes"})).await;
    let record = read_json(&mut ws).await;
    assert_eq!(record["type"], "workout_data");
    assert_eq!(record["data"]["activity"], "running");
    assert_eq!(record["data"]["duration"], 30);
    assert_eq!(record["data"]["difficulty"], "medium");

    let user = read_json(&mut ws).await;
    assert_eq!(user["type"], "transcript");
    assert_eq!(user["speaker"], "user");
    assert_eq!(read_json(&mut ws).await["type"], "transcript_received");
    let agent = read_json(&mut ws).await;
    assert_eq!(agent["type"], "transcript");
    assert_eq!(agent["speaker"], "agent");

    // Binary audio is queued; the pong proves it was handled first
    ws.send(Message::Binary(vec![0u8; 320].into())).await.unwrap();
    send_json(&mut ws, json!({"type": "ping"})).await;
    assert_eq!(read_json(&mut ws).await["type"], "pong");
    let session = state.registry.get(&id).unwrap();
    assert_eq!(session.bridge().input_len(), 1);

    send_json(&mut ws, json!({"type": "stop"})).await;
    let ended = read_json(&mut ws).await;
    assert_eq!(ended["type"], "ended");
    let _ = ws.close(None).await;

    wait_for_removal(&state, &id).await;
    assert!(!session.bridge().is_active());

    // The record outlives the session
    let request = Request::builder()
        .uri(format!("/api/conversations/{}/record", id))
        .body(Body::empty())
        .unwrap();
    let response = create_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["workout_data"]["activity"], "running");
}

/// Dropping the connection mid-conversation tears the session down
#[tokio::test]
async fn test_disconnect_closes_session() {
    let state = state();
    let url = boot_server(state.clone()).await;
    let mut ws = connect(&url).await;
    let id = open(&mut ws).await;

    send_json(&mut ws, json!({"type": "start"})).await;
    assert_eq!(read_json(&mut ws).await["type"], "started");
    drop(ws);

    wait_for_removal(&state, &id).await;
    assert_eq!(state.registry.count(), 0);
}

/// A close frame tears the session down
#[tokio::test]
async fn test_close_frame_closes_session() {
    let state = state();
    let url = boot_server(state.clone()).await;
    let mut ws = connect(&url).await;
    let id = open(&mut ws).await;

    ws.close(None).await.unwrap();

    wait_for_removal(&state, &id).await;
}

/// Without a gateway the client gets one error frame and the socket closes
#[tokio::test]
async fn test_missing_gateway_refuses_conversation() {
    let state = state().with_gateway(None);
    let url = boot_server(state.clone()).await;
    let mut ws = connect(&url).await;

    let error = read_json(&mut ws).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["message"], MISSING_CREDENTIALS);

    let next = timeout(TIMEOUT, ws.next()).await.expect("socket left open");
    assert!(!matches!(next, Some(Ok(Message::Text(_)))));
    assert_eq!(state.registry.count(), 0);
}
