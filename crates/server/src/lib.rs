//! Voice Coach Server
//!
//! Bridges a mobile client to a conversational agent over WebSocket, extracts
//! workout records from what the user says and serves them over HTTP.

pub mod conversation;
pub mod http;
pub mod metrics;
pub mod protocol;
pub mod session;
pub mod state;
pub mod websocket;

pub use conversation::{Conversation, Flow, Outbound};
pub use http::create_router;
pub use metrics::init_metrics;
pub use protocol::{decode_text, DecodeError, InboundMessage, OutboundMessage, Speaker};
pub use session::{Registry, Session, SessionState, SessionSummary};
pub use state::AppState;
pub use websocket::WebSocketHandler;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<ServerError> for axum::http::StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::Session(_) => axum::http::StatusCode::SERVICE_UNAVAILABLE,
            ServerError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            ServerError::Configuration(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Persistence(_) => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<voice_coach_persistence::PersistenceError> for ServerError {
    fn from(err: voice_coach_persistence::PersistenceError) -> Self {
        ServerError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        assert_eq!(StatusCode::from(ServerError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            StatusCode::from(ServerError::Configuration("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            StatusCode::from(ServerError::Session("full".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
