//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{bridge, endpoints, env, replies, timeouts, tts};
use crate::ConfigError;

/// Runtime environment enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Conversational agent and speech synthesis
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Audio bridge queue sizing
    #[serde(default)]
    pub bridge: BridgeConfig,

    /// Session registry limits
    #[serde(default)]
    pub session: SessionConfig,

    /// Persistence configuration (ScyllaDB)
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_gateway()?;
        self.validate_bridge()?;

        if self.session.max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "session.max_sessions".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.persistence.enabled && self.persistence.scylla_hosts.is_empty() {
            return Err(ConfigError::MissingField("persistence.scylla_hosts".to_string()));
        }

        // Credentials are checked per connection; production refuses to boot without them
        if self.environment.is_production() && !self.gateway.has_credentials() {
            return Err(ConfigError::MissingField(
                "gateway.agent_id / gateway.api_key".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if !server.ws_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "server.ws_path".to_string(),
                message: format!("Must start with '/', got {:?}", server.ws_path),
            });
        }

        Ok(())
    }

    fn validate_gateway(&self) -> Result<(), ConfigError> {
        let gateway = &self.gateway;

        for (field, value) in [
            ("gateway.reply_timeout_ms", gateway.reply_timeout_ms),
            ("gateway.synthesis_timeout_ms", gateway.synthesis_timeout_ms),
        ] {
            if value == 0 || value > timeouts::MAX_MS {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 1 and {} ms, got {}", timeouts::MAX_MS, value),
                });
            }
        }

        if gateway.fallback_reply.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "gateway.fallback_reply".to_string(),
                message: "Fallback reply cannot be empty".to_string(),
            });
        }

        if gateway.agent_backend == AgentBackendKind::ChatCompletions
            && gateway.agent_endpoint.trim().is_empty()
        {
            return Err(ConfigError::MissingField("gateway.agent_endpoint".to_string()));
        }

        Ok(())
    }

    fn validate_bridge(&self) -> Result<(), ConfigError> {
        if self.bridge.input_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bridge.input_capacity".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        if self.bridge.output_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "bridge.output_capacity".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// WebSocket path for conversations
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Public backend URL advertised by `/api/config`
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_ws_path() -> String {
    "/ws/conversation".to_string()
}
fn default_true() -> bool {
    true
}
fn default_backend_url() -> String {
    std::env::var(env::BACKEND_URL).unwrap_or_else(|_| endpoints::BACKEND_DEFAULT.to_string())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            backend_url: default_backend_url(),
        }
    }
}

/// Which conversational agent backend answers transcripts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentBackendKind {
    /// Keyword-driven workout coach replies, no remote call
    #[default]
    Scripted,
    /// OpenAI-compatible chat completion endpoint
    ChatCompletions,
}

/// Conversational agent and speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Agent identifier; required for a session to become ready
    #[serde(default = "default_agent_id")]
    pub agent_id: Option<String>,

    /// ElevenLabs API key; required for a session to become ready
    #[serde(default = "default_api_key")]
    pub api_key: Option<String>,

    #[serde(default)]
    pub agent_backend: AgentBackendKind,

    /// Base URL of the chat completion endpoint
    #[serde(default = "default_agent_endpoint")]
    pub agent_endpoint: String,

    #[serde(default = "default_agent_model")]
    pub agent_model: String,

    /// Bearer key for the chat completion endpoint
    #[serde(default = "default_agent_api_key")]
    pub agent_api_key: Option<String>,

    /// Text-to-speech API base URL
    #[serde(default = "default_tts_endpoint")]
    pub tts_endpoint: String,

    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    #[serde(default = "default_tts_model_id")]
    pub tts_model_id: String,

    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Disable to run text-only conversations
    #[serde(default = "default_true")]
    pub synthesis_enabled: bool,

    #[serde(default = "default_reply_timeout_ms")]
    pub reply_timeout_ms: u64,

    #[serde(default = "default_synthesis_timeout_ms")]
    pub synthesis_timeout_ms: u64,

    /// Reply used when the agent fails or times out
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
fn default_agent_id() -> Option<String> {
    non_empty_env(env::AGENT_ID)
}
fn default_api_key() -> Option<String> {
    non_empty_env(env::ELEVENLABS_API_KEY)
}
fn default_agent_api_key() -> Option<String> {
    non_empty_env(env::AGENT_API_KEY)
}
fn default_agent_endpoint() -> String {
    endpoints::CHAT_COMPLETIONS_DEFAULT.to_string()
}
fn default_agent_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_tts_endpoint() -> String {
    endpoints::ELEVENLABS_DEFAULT.to_string()
}
fn default_voice_id() -> String {
    tts::VOICE_ID.to_string()
}
fn default_tts_model_id() -> String {
    tts::MODEL_ID.to_string()
}
fn default_output_format() -> String {
    tts::OUTPUT_FORMAT.to_string()
}
fn default_reply_timeout_ms() -> u64 {
    timeouts::AGENT_REPLY_MS
}
fn default_synthesis_timeout_ms() -> u64 {
    timeouts::SYNTHESIS_MS
}
fn default_fallback_reply() -> String {
    replies::AGENT_FALLBACK.to_string()
}

impl GatewayConfig {
    /// Both the agent id and the API key are present and non-empty
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.agent_id) && present(&self.api_key)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            agent_id: default_agent_id(),
            api_key: default_api_key(),
            agent_backend: AgentBackendKind::default(),
            agent_endpoint: default_agent_endpoint(),
            agent_model: default_agent_model(),
            agent_api_key: default_agent_api_key(),
            tts_endpoint: default_tts_endpoint(),
            voice_id: default_voice_id(),
            tts_model_id: default_tts_model_id(),
            output_format: default_output_format(),
            synthesis_enabled: true,
            reply_timeout_ms: default_reply_timeout_ms(),
            synthesis_timeout_ms: default_synthesis_timeout_ms(),
            fallback_reply: default_fallback_reply(),
        }
    }
}

/// Audio bridge queue capacities, in chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_input_capacity")]
    pub input_capacity: usize,

    #[serde(default = "default_output_capacity")]
    pub output_capacity: usize,
}

fn default_input_capacity() -> usize {
    bridge::INPUT_CAPACITY
}
fn default_output_capacity() -> usize {
    bridge::OUTPUT_CAPACITY
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            input_capacity: default_input_capacity(),
            output_capacity: default_output_capacity(),
        }
    }
}

/// Session registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum concurrent live sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_sessions() -> usize {
    100
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_max_sessions(),
        }
    }
}

/// Persistence configuration for ScyllaDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Enable ScyllaDB persistence (false = in-memory only)
    #[serde(default)]
    pub enabled: bool,

    /// ScyllaDB host addresses
    #[serde(default = "default_scylla_hosts")]
    pub scylla_hosts: Vec<String>,

    /// ScyllaDB keyspace name
    #[serde(default = "default_scylla_keyspace")]
    pub keyspace: String,

    /// ScyllaDB replication factor
    #[serde(default = "default_replication_factor")]
    pub replication_factor: u8,
}

fn default_scylla_hosts() -> Vec<String> {
    std::env::var(env::SCYLLA_HOSTS)
        .map(|s| s.split(',').map(|h| h.trim().to_string()).collect())
        .unwrap_or_else(|_| vec!["127.0.0.1:9042".to_string()])
}

fn default_scylla_keyspace() -> String {
    std::env::var(env::SCYLLA_KEYSPACE).unwrap_or_else(|_| "voice_coach".to_string())
}

fn default_replication_factor() -> u8 {
    1
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false, // Disabled by default for development
            scylla_hosts: default_scylla_hosts(),
            keyspace: default_scylla_keyspace(),
            replication_factor: default_replication_factor(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable Prometheus metrics at /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    // Load default config
    builder = builder.add_source(File::with_name("config/default").required(false));

    // Load environment-specific config
    if let Some(env_name) = env {
        builder =
            builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    // Load from environment variables
    builder = builder.add_source(
        Environment::with_prefix("VOICE_COACH")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    // Validate
    settings.validate()?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_credentials() -> Settings {
        let mut settings = Settings::default();
        settings.gateway.agent_id = Some("agent-123".to_string());
        settings.gateway.api_key = Some("xi-key".to_string());
        settings
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8000);
        assert_eq!(settings.server.ws_path, "/ws/conversation");
        assert_eq!(settings.gateway.agent_backend, AgentBackendKind::Scripted);
        assert_eq!(settings.gateway.voice_id, "21m00Tcm4TlvDq8ikWAM");
        assert_eq!(settings.gateway.output_format, "mp3_44100_128");
        assert_eq!(settings.gateway.fallback_reply, replies::AGENT_FALLBACK);
        assert!(!settings.persistence.enabled);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(settings_with_credentials().validate().is_ok());
    }

    #[test]
    fn test_credentials_detection() {
        let mut settings = settings_with_credentials();
        assert!(settings.gateway.has_credentials());

        settings.gateway.api_key = Some("   ".to_string());
        assert!(!settings.gateway.has_credentials());

        settings.gateway.api_key = None;
        assert!(!settings.gateway.has_credentials());
    }

    #[test]
    fn test_production_requires_credentials() {
        let mut settings = settings_with_credentials();
        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate().is_ok());

        settings.gateway.agent_id = None;
        assert!(matches!(settings.validate(), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_timeout_validation() {
        let mut settings = settings_with_credentials();
        settings.gateway.reply_timeout_ms = 0;
        assert!(settings.validate().is_err());

        settings.gateway.reply_timeout_ms = timeouts::MAX_MS + 1;
        assert!(settings.validate().is_err());

        settings.gateway.reply_timeout_ms = 5_000;
        settings.gateway.synthesis_timeout_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_bridge_and_session_validation() {
        let mut settings = settings_with_credentials();
        settings.bridge.output_capacity = 0;
        assert!(settings.validate().is_err());

        settings.bridge.output_capacity = 8;
        settings.session.max_sessions = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = settings_with_credentials();
        settings.server.port = 0;
        assert!(settings.validate().is_err());

        settings.server.port = 9000;
        settings.server.ws_path = "ws".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_chat_backend_requires_endpoint() {
        let mut settings = settings_with_credentials();
        settings.gateway.agent_backend = AgentBackendKind::ChatCompletions;
        settings.gateway.agent_endpoint = String::new();
        assert!(matches!(settings.validate(), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_deserialize_partial_gateway() {
        let json = r#"{"gateway": {"agent_backend": "chat_completions", "reply_timeout_ms": 2500}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.gateway.agent_backend, AgentBackendKind::ChatCompletions);
        assert_eq!(settings.gateway.reply_timeout_ms, 2500);
        assert_eq!(settings.gateway.synthesis_timeout_ms, timeouts::SYNTHESIS_MS);
        assert_eq!(settings.bridge.input_capacity, bridge::INPUT_CAPACITY);
    }

    #[test]
    fn test_environment_flags() {
        assert!(RuntimeEnvironment::Production.is_production());
        assert!(!RuntimeEnvironment::Staging.is_production());
        assert!(!RuntimeEnvironment::Development.is_production());
    }
}
