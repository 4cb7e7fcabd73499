//! Audio chunk types and the per-session audio bridge
//!
//! The bridge decouples network-facing audio I/O from processing with two
//! bounded FIFO queues. Chunks are opaque bytes: never merged, split or
//! transformed.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

/// Raw audio bytes as received from (or sent to) the network
pub type AudioChunk = Vec<u8>;

/// Container format of synthesized audio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    /// 16-bit signed PCM (little-endian)
    Pcm,
    Ulaw,
}

impl AudioFormat {
    /// Short name sent to clients in `audio` frames
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Pcm => "pcm",
            AudioFormat::Ulaw => "ulaw",
        }
    }

    /// Derive the format from a synthesis output spec such as `mp3_44100_128`
    pub fn from_output_format(spec: &str) -> Self {
        let codec = spec.split('_').next().unwrap_or_default();
        match codec.to_lowercase().as_str() {
            "pcm" => AudioFormat::Pcm,
            "ulaw" => AudioFormat::Ulaw,
            _ => AudioFormat::Mp3,
        }
    }
}

/// Result of pushing a chunk onto a bridge queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Queue at capacity, chunk dropped
    Full,
    /// Bridge stopped, chunk dropped
    Stopped,
    /// Empty chunk, nothing to queue
    Empty,
}

impl PushOutcome {
    pub fn is_queued(&self) -> bool {
        matches!(self, PushOutcome::Queued)
    }
}

struct BoundedQueue {
    chunks: Mutex<VecDeque<AudioChunk>>,
    capacity: usize,
}

impl BoundedQueue {
    fn new(capacity: usize) -> Self {
        Self {
            chunks: Mutex::new(VecDeque::with_capacity(capacity.min(64))),
            capacity,
        }
    }

    fn push(&self, chunk: AudioChunk) -> PushOutcome {
        let mut chunks = self.chunks.lock();
        if chunks.len() >= self.capacity {
            return PushOutcome::Full;
        }
        chunks.push_back(chunk);
        PushOutcome::Queued
    }

    fn pop(&self) -> Option<AudioChunk> {
        self.chunks.lock().pop_front()
    }

    fn len(&self) -> usize {
        self.chunks.lock().len()
    }

    fn clear(&self) {
        self.chunks.lock().clear();
    }
}

/// Two bounded queues owned by one session
///
/// Producer/consumer roles are fixed: the network pushes input and the
/// processing side pops it; synthesis pushes output and the network pops it.
pub struct AudioBridge {
    input: BoundedQueue,
    output: BoundedQueue,
    active: AtomicBool,
}

impl AudioBridge {
    /// Create a bridge with the given per-queue capacities (each at least 1)
    pub fn new(input_capacity: usize, output_capacity: usize) -> Self {
        Self {
            input: BoundedQueue::new(input_capacity.max(1)),
            output: BoundedQueue::new(output_capacity.max(1)),
            active: AtomicBool::new(true),
        }
    }

    /// Queue a chunk received from the network
    pub fn push_input(&self, chunk: AudioChunk) -> PushOutcome {
        self.push(&self.input, chunk)
    }

    /// Take the oldest queued input chunk, if any
    pub fn pop_input(&self) -> Option<AudioChunk> {
        self.input.pop()
    }

    /// Queue a synthesized chunk for delivery to the network
    pub fn push_output(&self, chunk: AudioChunk) -> PushOutcome {
        self.push(&self.output, chunk)
    }

    /// Take the oldest queued output chunk without blocking
    pub fn pop_output(&self) -> Option<AudioChunk> {
        if !self.is_active() {
            return None;
        }
        self.output.pop()
    }

    /// Stop the bridge. Later pushes are no-ops and queued chunks are dropped.
    ///
    /// Returns `true` only for the call that actually stopped it.
    pub fn stop(&self) -> bool {
        let was_active = self.active.swap(false, Ordering::AcqRel);
        if was_active {
            self.input.clear();
            self.output.clear();
        }
        was_active
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    pub fn output_len(&self) -> usize {
        self.output.len()
    }

    fn push(&self, queue: &BoundedQueue, chunk: AudioChunk) -> PushOutcome {
        if !self.is_active() {
            return PushOutcome::Stopped;
        }
        if chunk.is_empty() {
            return PushOutcome::Empty;
        }
        queue.push(chunk)
    }
}

impl std::fmt::Debug for AudioBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBridge")
            .field("active", &self.is_active())
            .field("input_len", &self.input_len())
            .field("output_len", &self.output_len())
            .finish()
    }
}
