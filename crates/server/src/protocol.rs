//! Conversation wire protocol
//!
//! Text frames carry JSON objects discriminated by `type`. Binary frames are
//! raw audio and never pass through this module.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use voice_coach_core::{AudioFormat, ExtractedRecord};

/// Client control messages
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    Start,
    /// Final user transcript
    Transcript {
        #[serde(default)]
        text: String,
    },
    #[serde(alias = "end")]
    Stop,
    Ping,
    /// Request the latest extracted record
    #[serde(alias = "get_workout_data")]
    GetData,
    /// Unrecognized `type`, ignored
    #[serde(other)]
    Unknown,
}

/// Reasons a text frame could not become an [`InboundMessage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    InvalidJson,
    /// Valid JSON with the wrong shape for its `type`
    Malformed(String),
}

impl DecodeError {
    /// Text for the `error` frame sent back to the client
    pub fn client_message(&self) -> String {
        match self {
            DecodeError::InvalidJson => "Invalid JSON format".to_string(),
            DecodeError::Malformed(reason) => format!("Malformed message: {}", reason),
        }
    }
}

/// Decode a text frame
///
/// Objects without a string `type` are treated as unknown messages.
pub fn decode_text(text: &str) -> Result<InboundMessage, DecodeError> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|_| DecodeError::InvalidJson)?;

    let object = value
        .as_object()
        .ok_or_else(|| DecodeError::Malformed("expected a JSON object".to_string()))?;

    if !object.get("type").is_some_and(|t| t.is_string()) {
        return Ok(InboundMessage::Unknown);
    }

    serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Server messages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Connected {
        conversation_id: String,
        status: String,
        mode: String,
    },
    Started {
        conversation_id: String,
    },
    Transcript {
        speaker: Speaker,
        text: String,
    },
    TranscriptReceived {
        conversation_id: String,
    },
    /// Extracted record; `data` is null when nothing was extracted yet
    #[serde(rename = "workout_data")]
    Record {
        conversation_id: String,
        data: Option<ExtractedRecord>,
    },
    /// Base64 encoded audio
    Audio {
        data: String,
        format: AudioFormat,
    },
    Pong,
    Ended {
        conversation_id: String,
    },
    Error {
        message: String,
    },
}

impl OutboundMessage {
    pub fn connected(conversation_id: &str) -> Self {
        OutboundMessage::Connected {
            conversation_id: conversation_id.to_string(),
            status: "ready".to_string(),
            mode: "transcript".to_string(),
        }
    }

    pub fn audio(bytes: &[u8], format: AudioFormat) -> Self {
        OutboundMessage::Audio {
            data: BASE64.encode(bytes),
            format,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        OutboundMessage::Error {
            message: message.into(),
        }
    }

    /// Tag as sent on the wire, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::Connected { .. } => "connected",
            OutboundMessage::Started { .. } => "started",
            OutboundMessage::Transcript { .. } => "transcript",
            OutboundMessage::TranscriptReceived { .. } => "transcript_received",
            OutboundMessage::Record { .. } => "workout_data",
            OutboundMessage::Audio { .. } => "audio",
            OutboundMessage::Pong => "pong",
            OutboundMessage::Ended { .. } => "ended",
            OutboundMessage::Error { .. } => "error",
        }
    }
}

/// Who said a transcript line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}
