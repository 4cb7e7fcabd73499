//! ElevenLabs text-to-speech client

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use voice_coach_config::constants::{endpoints, tts};
use voice_coach_core::{AudioFormat, Error, Result, SpeechSynthesizer, SynthesizedAudio};

use crate::GatewayError;

/// ElevenLabs synthesis configuration
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API base URL
    pub endpoint: String,
    /// `xi-api-key` header value
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    /// e.g. `mp3_44100_128`
    pub output_format: String,
    pub timeout: Duration,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            endpoint: endpoints::ELEVENLABS_DEFAULT.to_string(),
            api_key: String::new(),
            voice_id: tts::VOICE_ID.to_string(),
            model_id: tts::MODEL_ID.to_string(),
            output_format: tts::OUTPUT_FORMAT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Speech synthesizer backed by the ElevenLabs REST API
pub struct ElevenLabsTts {
    config: ElevenLabsConfig,
    format: AudioFormat,
    client: Client,
}

impl ElevenLabsTts {
    pub fn new(config: ElevenLabsConfig) -> std::result::Result<Self, GatewayError> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::Configuration(
                "ElevenLabs API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let format = AudioFormat::from_output_format(&config.output_format);
        Ok(Self {
            config,
            format,
            client,
        })
    }

    fn synthesis_url(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.voice_id,
            self.config.output_format
        )
    }

    async fn request_audio(&self, text: &str) -> std::result::Result<Vec<u8>, GatewayError> {
        let body = SynthesisRequest {
            text,
            model_id: &self.config.model_id,
        };

        let response = self
            .client
            .post(self.synthesis_url())
            .header("xi-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(GatewayError::InvalidResponse("Empty audio body".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTts {
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio> {
        let bytes = self
            .request_audio(text)
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        tracing::debug!(bytes = bytes.len(), voice_id = %self.config.voice_id, "Synthesized reply");

        Ok(SynthesizedAudio {
            bytes,
            format: self.format,
        })
    }

    fn format(&self) -> AudioFormat {
        self.format
    }

    fn model_name(&self) -> &str {
        &self.config.model_id
    }
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ElevenLabsConfig {
        ElevenLabsConfig {
            api_key: "xi-test".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            ElevenLabsTts::new(ElevenLabsConfig::default()),
            Err(GatewayError::Configuration(_))
        ));
        assert!(ElevenLabsTts::new(config()).is_ok());
    }

    #[test]
    fn test_synthesis_url() {
        let tts = ElevenLabsTts::new(config()).unwrap();
        assert_eq!(
            tts.synthesis_url(),
            "https://api.elevenlabs.io/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM?output_format=mp3_44100_128"
        );
    }

    #[test]
    fn test_reported_format() {
        let tts = ElevenLabsTts::new(config()).unwrap();
        assert_eq!(tts.format(), AudioFormat::Mp3);
        assert_eq!(tts.model_name(), "eleven_monolingual_v1");
    }

    #[test]
    fn test_request_body() {
        let body = SynthesisRequest {
            text: "Great job",
            model_id: "eleven_monolingual_v1",
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["text"], "Great job");
        assert_eq!(json["model_id"], "eleven_monolingual_v1");
    }
}
