//! WebSocket Handler
//!
//! Binary frames are raw audio input; text frames are JSON control messages.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::conversation::{Conversation, Flow, Outbound};
use crate::protocol::OutboundMessage;
use crate::state::AppState;

/// Outbound half of a WebSocket
pub struct WsOutbound {
    sender: Arc<Mutex<SplitSink<WebSocket, Message>>>,
}

#[async_trait]
impl Outbound for WsOutbound {
    async fn deliver(&self, message: &OutboundMessage) -> bool {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(kind = message.kind(), error = %e, "Failed to encode message");
                return false;
            },
        };

        let mut sender = self.sender.lock().await;
        match sender.send(Message::Text(json)).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(kind = message.kind(), error = %e, "WebSocket send failed");
                false
            },
        }
    }
}

/// WebSocket handler
pub struct WebSocketHandler;

impl WebSocketHandler {
    /// Handle WebSocket upgrade
    pub async fn handle(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
        ws.on_upgrade(move |socket| Self::handle_socket(socket, state))
    }

    /// Handle WebSocket connection
    async fn handle_socket(socket: WebSocket, state: AppState) {
        let (sender, mut receiver) = socket.split();
        let sender = Arc::new(Mutex::new(sender));
        let outbound = WsOutbound {
            sender: sender.clone(),
        };

        let Some(conversation) = Conversation::open(
            state.registry.clone(),
            state.gateway.clone(),
            state.extractor,
            outbound,
        )
        .await
        else {
            let _ = sender.lock().await.close().await;
            return;
        };

        tracing::info!(session_id = %conversation.id(), "WebSocket conversation opened");

        // Main message loop
        while let Some(msg) = receiver.next().await {
            let flow = match msg {
                Ok(Message::Text(text)) => conversation.handle_text(&text).await,
                Ok(Message::Binary(data)) => conversation.handle_binary(data).await,
                // Pongs are answered by axum
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => Flow::Continue,
                Ok(Message::Close(_)) => {
                    tracing::info!(session_id = %conversation.id(), "Client closed WebSocket");
                    Flow::Stop
                },
                Err(e) => {
                    tracing::info!(session_id = %conversation.id(), error = %e, "WebSocket read failed");
                    conversation.end().await;
                    Flow::Stop
                },
            };

            if flow == Flow::Stop {
                break;
            }
        }

        // Cleanup
        conversation.close();
        let _ = sender.lock().await.close().await;
    }
}
