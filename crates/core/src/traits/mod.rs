//! Core traits for the voice coach bridge
//!
//! Every external collaborator sits behind one of these traits so backends
//! can be swapped from configuration and replaced with mocks in tests.
//!
//! ```text
//! Conversation:
//!   - ConversationalAgent: user text → agent reply
//!
//! Speech:
//!   - SpeechSynthesizer: reply text → audio bytes
//!
//! Persistence:
//!   - RecordSink: session id ↔ last extracted record
//! ```

mod agent;
mod sink;
mod speech;

pub use agent::ConversationalAgent;
pub use sink::RecordSink;
pub use speech::{SpeechSynthesizer, SynthesizedAudio};
