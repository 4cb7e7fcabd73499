//! Gateway factory
//!
//! Builds an [`AgentGateway`] from configuration. A session may only become
//! ready once this succeeds, so missing credentials are reported here.

use std::sync::Arc;
use std::time::Duration;

use voice_coach_config::{AgentBackendKind, GatewayConfig};
use voice_coach_core::ConversationalAgent;

use crate::{
    backend::{ChatCompletionsAgent, ChatCompletionsConfig},
    scripted::ScriptedCoach,
    tts::{ElevenLabsConfig, ElevenLabsTts},
    AgentGateway, GatewayError,
};

/// Error text sent to clients when the gateway cannot be built
pub const MISSING_CREDENTIALS: &str = "AGENT_ID or ELEVENLABS_API_KEY not configured";

pub struct GatewayFactory;

impl GatewayFactory {
    /// Create a gateway from configuration
    pub fn create(config: &GatewayConfig) -> Result<AgentGateway, GatewayError> {
        if !config.has_credentials() {
            return Err(GatewayError::Configuration(MISSING_CREDENTIALS.to_string()));
        }

        let agent = Self::create_agent(config)?;
        tracing::info!(agent = %agent.name(), "Created conversational agent");

        let mut gateway = AgentGateway::new(agent)
            .with_timeouts(
                Duration::from_millis(config.reply_timeout_ms),
                Duration::from_millis(config.synthesis_timeout_ms),
            )
            .with_fallback(config.fallback_reply.clone());

        if config.synthesis_enabled {
            let tts = ElevenLabsTts::new(ElevenLabsConfig {
                endpoint: config.tts_endpoint.clone(),
                api_key: config.api_key.clone().unwrap_or_default(),
                voice_id: config.voice_id.clone(),
                model_id: config.tts_model_id.clone(),
                output_format: config.output_format.clone(),
                // Outer bound only; the gateway enforces synthesis_timeout_ms
                timeout: Duration::from_millis(config.synthesis_timeout_ms.saturating_mul(2)),
            })?;
            gateway = gateway.with_synthesizer(Arc::new(tts));
        }

        Ok(gateway)
    }

    /// Create just the agent backend
    pub fn create_agent(config: &GatewayConfig) -> Result<Arc<dyn ConversationalAgent>, GatewayError> {
        match config.agent_backend {
            AgentBackendKind::Scripted => Ok(Arc::new(ScriptedCoach::new())),
            AgentBackendKind::ChatCompletions => {
                let agent = ChatCompletionsAgent::new(ChatCompletionsConfig {
                    endpoint: config.agent_endpoint.clone(),
                    api_key: config.agent_api_key.clone().unwrap_or_default(),
                    model: config.agent_model.clone(),
                    timeout: Duration::from_millis(config.reply_timeout_ms.saturating_mul(2)),
                    ..Default::default()
                })?;
                Ok(Arc::new(agent))
            },
        }
    }
}
