//! Speech synthesis trait

use async_trait::async_trait;

use crate::{AudioFormat, Result};

/// Synthesized audio returned by a [`SpeechSynthesizer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

/// Text-to-Speech interface
///
/// Implementations:
/// - `ElevenLabsTts` - remote ElevenLabs text-to-speech API
///
/// # Example
///
/// ```ignore
/// let tts: Arc<dyn SpeechSynthesizer> = Arc::new(ElevenLabsTts::new(config)?);
/// let audio = tts.synthesize("Great run!").await?;
/// println!("{} bytes of {}", audio.bytes.len(), audio.format.as_str());
/// ```
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Synthesize text to a single audio buffer
    async fn synthesize(&self, text: &str) -> Result<SynthesizedAudio>;

    /// Format of the audio this synthesizer produces
    fn format(&self) -> AudioFormat;

    /// Get model name for logging
    fn model_name(&self) -> &str;
}
