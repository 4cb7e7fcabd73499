//! Core traits and types for the voice coach bridge
//!
//! This crate provides foundational types used across all other crates:
//! - Extracted workout records (activity, duration, intensity)
//! - Audio chunk types and the per-session `AudioBridge`
//! - Collaborator traits (conversational agent, speech synthesis, record sink)
//! - Error types

pub mod audio;
pub mod error;
pub mod record;
pub mod traits;

pub use audio::{AudioBridge, AudioChunk, AudioFormat, PushOutcome};
pub use error::{Error, Result};
pub use record::{Activity, ExtractedRecord, Intensity};

pub use traits::{ConversationalAgent, RecordSink, SpeechSynthesizer, SynthesizedAudio};
