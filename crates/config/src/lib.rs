//! Configuration management for the voice coach bridge
//!
//! Supports loading configuration from:
//! - YAML/TOML/JSON files under `config/`
//! - Environment variables (VOICE_COACH_ prefix, `__` separator)
//! - The original service's bare variables (`AGENT_ID`, `ELEVENLABS_API_KEY`,
//!   `BACKEND_URL`) as defaults

pub mod constants;
pub mod settings;

pub use settings::{
    load_settings, AgentBackendKind, BridgeConfig, GatewayConfig, ObservabilityConfig,
    PersistenceConfig, RuntimeEnvironment, ServerConfig, SessionConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
