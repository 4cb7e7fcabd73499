//! Agent gateway
//!
//! Wraps the conversational agent and the speech synthesizer behind explicit
//! timeouts. `reply` always yields something to say; `synthesize` yields
//! audio or nothing. Neither surfaces an error to the conversation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use voice_coach_config::constants::{replies, timeouts};
use voice_coach_core::{ConversationalAgent, Error, SpeechSynthesizer, SynthesizedAudio};

pub struct AgentGateway {
    agent: Arc<dyn ConversationalAgent>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    reply_timeout: Duration,
    synthesis_timeout: Duration,
    fallback: String,
}

impl AgentGateway {
    /// Gateway with default timeouts and fallback text
    pub fn new(agent: Arc<dyn ConversationalAgent>) -> Self {
        Self {
            agent,
            synthesizer: None,
            reply_timeout: Duration::from_millis(timeouts::AGENT_REPLY_MS),
            synthesis_timeout: Duration::from_millis(timeouts::SYNTHESIS_MS),
            fallback: replies::AGENT_FALLBACK.to_string(),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_timeouts(mut self, reply: Duration, synthesis: Duration) -> Self {
        self.reply_timeout = reply;
        self.synthesis_timeout = synthesis;
        self
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    pub fn has_synthesizer(&self) -> bool {
        self.synthesizer.is_some()
    }

    /// Ask the agent for a reply
    ///
    /// Failure, timeout or a blank reply all produce the fallback text.
    pub async fn reply(&self, session_id: &str, text: &str) -> String {
        let start = Instant::now();
        let outcome = tokio::time::timeout(self.reply_timeout, self.agent.reply(session_id, text)).await;
        metrics::histogram!("voice_coach_agent_reply_seconds").record(start.elapsed().as_secs_f64());

        let failure = match outcome {
            Ok(Ok(reply)) if !reply.trim().is_empty() => return reply,
            Ok(Ok(_)) => "empty reply".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => Error::Timeout(self.reply_timeout.as_millis() as u64).to_string(),
        };

        tracing::warn!(
            session_id = %session_id,
            agent = %self.agent.name(),
            reason = %failure,
            "Agent reply failed, using fallback"
        );
        metrics::counter!("voice_coach_agent_fallbacks_total").increment(1);
        self.fallback.clone()
    }

    /// Synthesize speech for a reply
    ///
    /// Returns `None` when no synthesizer is configured, on failure or on
    /// timeout.
    pub async fn synthesize(&self, session_id: &str, text: &str) -> Option<SynthesizedAudio> {
        let synthesizer = self.synthesizer.as_ref()?;

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.synthesis_timeout, synthesizer.synthesize(text)).await;
        metrics::histogram!("voice_coach_synthesis_seconds").record(start.elapsed().as_secs_f64());

        let failure = match outcome {
            Ok(Ok(audio)) if !audio.bytes.is_empty() => return Some(audio),
            Ok(Ok(_)) => "empty audio".to_string(),
            Ok(Err(e)) => e.to_string(),
            Err(_) => Error::Timeout(self.synthesis_timeout.as_millis() as u64).to_string(),
        };

        tracing::warn!(
            session_id = %session_id,
            model = %synthesizer.model_name(),
            reason = %failure,
            "Speech synthesis failed, skipping audio"
        );
        metrics::counter!("voice_coach_synthesis_failures_total").increment(1);
        None
    }
}

impl std::fmt::Debug for AgentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentGateway")
            .field("agent", &self.agent.name())
            .field("synthesizer", &self.synthesizer.as_ref().map(|s| s.model_name().to_string()))
            .field("reply_timeout", &self.reply_timeout)
            .field("synthesis_timeout", &self.synthesis_timeout)
            .finish()
    }
}
