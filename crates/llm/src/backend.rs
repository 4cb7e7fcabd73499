//! OpenAI-compatible chat completion agent
//!
//! Works with OpenAI, vLLM and any local server exposing
//! `POST {endpoint}/chat/completions`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use voice_coach_core::{ConversationalAgent, Result};

use crate::GatewayError;

/// Persona sent as the system message
const COACH_PROMPT: &str = "You are a friendly fitness coach taking a spoken workout log. \
Keep replies to one or two short sentences. If the user has not said which activity they \
did or for how many minutes, ask for it. Otherwise confirm that the workout was logged.";

/// Configuration for OpenAI-compatible backends
#[derive(Debug, Clone)]
pub struct ChatCompletionsConfig {
    /// API endpoint (OpenAI: https://api.openai.com/v1)
    pub endpoint: String,
    /// API key
    pub api_key: String,
    /// Model name
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Temperature (0-2)
    pub temperature: f32,
    /// Request timeout; the gateway applies its own, shorter one on top
    pub timeout: Duration,
}

impl Default for ChatCompletionsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 128,
            temperature: 0.7,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ChatCompletionsConfig {
    /// Create config for OpenAI
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            ..Default::default()
        }
    }

    /// Create config for local OpenAI-compatible server (vLLM, Ollama, etc.)
    pub fn local(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: "not-needed".to_string(),
            model: model.into(),
            ..Default::default()
        }
    }
}

/// Chat completion backed conversational agent
pub struct ChatCompletionsAgent {
    config: ChatCompletionsConfig,
    client: Client,
}

impl ChatCompletionsAgent {
    pub fn new(config: ChatCompletionsConfig) -> std::result::Result<Self, GatewayError> {
        if config.api_key.is_empty() && !is_local(&config.endpoint) {
            return Err(GatewayError::Configuration(
                "API key required for remote endpoints".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Get the full API URL for chat completions
    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.config.endpoint.trim_end_matches('/'))
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: COACH_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
            stream: Some(false),
        }
    }

    async fn complete(&self, text: &str) -> std::result::Result<String, GatewayError> {
        let response = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.config.api_key)
            .json(&self.build_request(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::InvalidResponse("No choices in response".to_string()))?;

        Ok(choice.message.content.trim().to_string())
    }
}

fn is_local(endpoint: &str) -> bool {
    endpoint.starts_with("http://localhost") || endpoint.starts_with("http://127.0.0.1")
}

#[async_trait]
impl ConversationalAgent for ChatCompletionsAgent {
    async fn reply(&self, session_id: &str, text: &str) -> Result<String> {
        tracing::debug!(session_id = %session_id, model = %self.config.model, "Requesting chat completion");
        Ok(self.complete(text).await?)
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ChatCompletionsConfig::default();
        assert_eq!(config.endpoint, "https://api.openai.com/v1");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_agent_creation() {
        // Local endpoint should work without API key
        let config = ChatCompletionsConfig::local("http://localhost:8000/v1", "llama-3");
        assert!(ChatCompletionsAgent::new(config).is_ok());

        // Remote endpoint requires API key
        let config = ChatCompletionsConfig::default();
        assert!(matches!(
            ChatCompletionsAgent::new(config),
            Err(GatewayError::Configuration(_))
        ));

        let config = ChatCompletionsConfig::openai("sk-xxx", "gpt-4o-mini");
        assert!(ChatCompletionsAgent::new(config).is_ok());
    }

    #[test]
    fn test_chat_url() {
        let config = ChatCompletionsConfig::local("http://localhost:8000/v1/", "llama-3");
        let agent = ChatCompletionsAgent::new(config).unwrap();
        assert_eq!(agent.chat_url(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_request_serialization() {
        let agent = ChatCompletionsAgent::new(ChatCompletionsConfig::openai("sk-xxx", "gpt-4o-mini"))
            .unwrap();
        let json = serde_json::to_value(agent.build_request("I ran 5 minutes")).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "I ran 5 minutes");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":" Logged! "},"finish_reason":"stop"}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, " Logged! ");
    }
}
