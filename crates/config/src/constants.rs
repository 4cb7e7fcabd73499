//! Centralized constants for the voice coach bridge
//!
//! Single source of truth for default values that would otherwise be
//! duplicated between the gateway, server and configuration layers.

/// Canned replies
pub mod replies {
    /// Spoken when the conversational agent fails or times out
    pub const AGENT_FALLBACK: &str = "I understand you want to log a workout. Could you tell me what activity you did and for how long?";
}

/// Service endpoints (defaults)
pub mod endpoints {
    /// ElevenLabs API base URL
    pub const ELEVENLABS_DEFAULT: &str = "https://api.elevenlabs.io";

    /// OpenAI-compatible chat completion base URL
    pub const CHAT_COMPLETIONS_DEFAULT: &str = "https://api.openai.com/v1";

    /// Public URL of this backend, advertised to clients
    pub const BACKEND_DEFAULT: &str = "http://localhost:8000";
}

/// Speech synthesis defaults
pub mod tts {
    /// ElevenLabs "Rachel" voice
    pub const VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";

    pub const MODEL_ID: &str = "eleven_monolingual_v1";

    /// MP3, 44.1kHz, 128kbps
    pub const OUTPUT_FORMAT: &str = "mp3_44100_128";
}

/// Timeouts (in milliseconds)
pub mod timeouts {
    /// Conversational agent reply timeout
    pub const AGENT_REPLY_MS: u64 = 10_000;

    /// Speech synthesis timeout
    pub const SYNTHESIS_MS: u64 = 15_000;

    /// Upper bound accepted for either timeout
    pub const MAX_MS: u64 = 120_000;
}

/// Audio bridge queue capacities (chunks)
pub mod bridge {
    pub const INPUT_CAPACITY: usize = 256;
    pub const OUTPUT_CAPACITY: usize = 64;
}

/// Record retention
pub mod records {
    /// How long a session's latest record stays readable (7 days)
    pub const TTL_SECS: u64 = 604_800;
}

/// Environment variable names read by the original service
pub mod env {
    pub const AGENT_ID: &str = "AGENT_ID";
    pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";
    pub const AGENT_API_KEY: &str = "AGENT_API_KEY";
    pub const BACKEND_URL: &str = "BACKEND_URL";
    pub const SCYLLA_HOSTS: &str = "SCYLLA_HOSTS";
    pub const SCYLLA_KEYSPACE: &str = "SCYLLA_KEYSPACE";
}
