//! Agent gateway for the voice coach bridge
//!
//! Features:
//! - Conversational agent backends (scripted coach, OpenAI-compatible chat)
//! - ElevenLabs speech synthesis
//! - Explicit timeouts with a canned fallback reply

pub mod backend;
pub mod factory;
pub mod gateway;
pub mod scripted;
pub mod tts;

pub use backend::{ChatCompletionsAgent, ChatCompletionsConfig};
pub use factory::GatewayFactory;
pub use gateway::AgentGateway;
pub use scripted::ScriptedCoach;
pub use tts::{ElevenLabsConfig, ElevenLabsTts};

use thiserror::Error;

/// Gateway errors
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Network(err.to_string())
        }
    }
}

impl From<GatewayError> for voice_coach_core::Error {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Configuration(msg) => voice_coach_core::Error::Configuration(msg),
            other => voice_coach_core::Error::Agent(other.to_string()),
        }
    }
}
