//! Per-connection conversation driver
//!
//! Owns one [`Session`] for the lifetime of a connection and runs its state
//! machine. Messages are handled strictly in arrival order; gateway calls are
//! awaited inline so a transcript's frames are never interleaved with the
//! next message's.

use async_trait::async_trait;
use std::sync::Arc;

use voice_coach_core::{AudioFormat, PushOutcome};
use voice_coach_llm::{factory::MISSING_CREDENTIALS, AgentGateway};
use voice_coach_text_processing::Extractor;

use crate::metrics;
use crate::protocol::{decode_text, InboundMessage, OutboundMessage, Speaker};
use crate::session::{Registry, Session, SessionState};

/// Sink for server messages
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Deliver one message; `false` once the client can no longer be reached
    async fn deliver(&self, message: &OutboundMessage) -> bool;
}

/// What the connection loop should do after a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub struct Conversation<O: Outbound> {
    session: Arc<Session>,
    registry: Arc<Registry>,
    gateway: Arc<AgentGateway>,
    extractor: Extractor,
    outbound: O,
}

impl<O: Outbound> Conversation<O> {
    /// Register a session and perform the `Connecting -> Ready` handshake
    ///
    /// Returns `None` after sending an `error` frame when the registry is
    /// full or no gateway is configured. In the latter case the session goes
    /// straight to `Closed`.
    pub async fn open(
        registry: Arc<Registry>,
        gateway: Option<Arc<AgentGateway>>,
        extractor: Extractor,
        outbound: O,
    ) -> Option<Self> {
        let id = uuid::Uuid::new_v4().to_string();

        let session = match registry.create(&id) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Refusing conversation");
                outbound.deliver(&OutboundMessage::error(e.to_string())).await;
                return None;
            },
        };

        let Some(gateway) = gateway else {
            tracing::warn!(session_id = %id, "Gateway not configured, closing conversation");
            outbound.deliver(&OutboundMessage::error(MISSING_CREDENTIALS)).await;
            session.transition(SessionState::Closed);
            session.bridge().stop();
            registry.remove(&id);
            return None;
        };

        session.transition(SessionState::Ready);
        metrics::record_session_opened(registry.count());

        let conversation = Self {
            session,
            registry,
            gateway,
            extractor,
            outbound,
        };
        conversation.send(OutboundMessage::connected(&id)).await;
        Some(conversation)
    }

    pub fn id(&self) -> &str {
        &self.session.id
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Handle a text frame
    pub async fn handle_text(&self, text: &str) -> Flow {
        self.session.touch();

        match decode_text(text) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => {
                tracing::debug!(session_id = %self.session.id, error = ?e, "Undecodable message");
                metrics::record_protocol_error(match e {
                    crate::protocol::DecodeError::InvalidJson => "invalid_json",
                    crate::protocol::DecodeError::Malformed(_) => "malformed",
                });
                self.send(OutboundMessage::error(e.client_message())).await;
                self.flow()
            },
        }
    }

    /// Handle a decoded control message
    pub async fn handle_message(&self, message: InboundMessage) -> Flow {
        let state = self.session.state();

        match message {
            InboundMessage::Start => match state {
                SessionState::Ready => {
                    if self.session.transition(SessionState::Active) {
                        tracing::info!(session_id = %self.session.id, "Conversation started");
                        self.send(OutboundMessage::Started {
                            conversation_id: self.session.id.clone(),
                        })
                        .await;
                    }
                },
                _ => {
                    tracing::debug!(session_id = %self.session.id, state = ?state, "Ignoring start");
                },
            },
            InboundMessage::Transcript { text } => {
                if state != SessionState::Active {
                    tracing::debug!(session_id = %self.session.id, state = ?state, "Transcript before start ignored");
                } else if text.trim().is_empty() {
                    tracing::debug!(session_id = %self.session.id, "Empty transcript ignored");
                } else {
                    self.handle_transcript(&text).await;
                }
            },
            InboundMessage::Stop => {
                if self.end().await {
                    tracing::info!(session_id = %self.session.id, "Conversation stopped by client");
                    return Flow::Stop;
                }
            },
            InboundMessage::Ping => {
                if state.is_open() {
                    self.send(OutboundMessage::Pong).await;
                }
            },
            InboundMessage::GetData => {
                if state.is_open() {
                    let data = match self.session.last_record() {
                        Some(record) => Some(record),
                        None => self.registry.last_record(&self.session.id).await,
                    };
                    self.send(OutboundMessage::Record {
                        conversation_id: self.session.id.clone(),
                        data,
                    })
                    .await;
                }
            },
            InboundMessage::Unknown => {
                tracing::debug!(session_id = %self.session.id, "Unknown message type ignored");
            },
        }

        self.flow()
    }

    /// Handle a binary audio frame
    pub async fn handle_binary(&self, chunk: Vec<u8>) -> Flow {
        self.session.touch();

        if self.session.state() != SessionState::Active {
            tracing::debug!(session_id = %self.session.id, bytes = chunk.len(), "Audio outside active conversation ignored");
            return self.flow();
        }

        match self.session.bridge().push_input(chunk) {
            PushOutcome::Queued | PushOutcome::Empty => {},
            PushOutcome::Full => {
                tracing::debug!(session_id = %self.session.id, "Audio input queue full, chunk dropped");
                metrics::record_audio_dropped("input");
            },
            PushOutcome::Stopped => {
                tracing::debug!(session_id = %self.session.id, "Audio bridge stopped, chunk dropped");
            },
        }

        self.flow()
    }

    async fn handle_transcript(&self, text: &str) {
        let id = self.session.id.clone();

        if let Some(record) = self.extractor.extract(text) {
            tracing::info!(
                session_id = %id,
                activity = %record.activity,
                duration = record.duration,
                intensity = %record.intensity,
                "Workout record extracted"
            );
            self.session.push_record(record.clone());
            self.registry.save_record(&id, &record).await;
            metrics::record_extraction();
            self.send(OutboundMessage::Record {
                conversation_id: id.clone(),
                data: Some(record),
            })
            .await;
        }

        self.send(OutboundMessage::Transcript {
            speaker: Speaker::User,
            text: text.to_string(),
        })
        .await;
        self.send(OutboundMessage::TranscriptReceived {
            conversation_id: id.clone(),
        })
        .await;

        if !self.session.is_live() {
            return;
        }

        let reply = self.gateway.reply(&id, text).await;
        self.send(OutboundMessage::Transcript {
            speaker: Speaker::Agent,
            text: reply.clone(),
        })
        .await;

        if let Some(audio) = self.gateway.synthesize(&id, &reply).await {
            if self.session.bridge().push_output(audio.bytes) == PushOutcome::Full {
                tracing::warn!(session_id = %id, "Audio output queue full, reply audio dropped");
                metrics::record_audio_dropped("output");
            }
            self.drain_output(audio.format).await;
        }
    }

    /// Send every queued output chunk as an `audio` frame
    async fn drain_output(&self, format: AudioFormat) {
        while let Some(chunk) = self.session.bridge().pop_output() {
            if !self.send(OutboundMessage::audio(&chunk, format)).await {
                break;
            }
        }
    }

    /// Guarded send
    ///
    /// Skips delivery once the client is known to be gone, and marks the
    /// session unreachable on the first failure.
    pub async fn send(&self, message: OutboundMessage) -> bool {
        if !self.session.is_live() {
            return false;
        }
        let delivered = self.outbound.deliver(&message).await;
        if !delivered {
            tracing::debug!(session_id = %self.session.id, kind = message.kind(), "Send failed");
            self.session.mark_unreachable();
        }
        delivered
    }

    /// Move to `Ending` and send `ended`
    ///
    /// Used for an explicit stop and for an unrecoverable read error. The
    /// send is best-effort. Returns `false` without sending anything when the
    /// conversation is no longer open, so `ended` goes out at most once.
    pub async fn end(&self) -> bool {
        if !self.session.state().is_open() || !self.session.transition(SessionState::Ending) {
            return false;
        }
        self.send(OutboundMessage::Ended {
            conversation_id: self.session.id.clone(),
        })
        .await;
        true
    }

    fn flow(&self) -> Flow {
        if self.session.is_live() {
            Flow::Continue
        } else {
            Flow::Stop
        }
    }

    /// Tear the conversation down
    ///
    /// Stops the audio bridge and removes the session from the registry.
    /// Records stay in the sink. Only the first call has any effect.
    pub fn close(&self) -> bool {
        if self.session.state().is_open() {
            self.session.transition(SessionState::Ending);
        }
        if !self.session.transition(SessionState::Closed) {
            return false;
        }

        self.session.bridge().stop();
        self.registry.remove(&self.session.id);
        metrics::record_session_closed(self.registry.count());

        tracing::info!(
            session_id = %self.session.id,
            records = self.session.record_count(),
            "Conversation closed"
        );
        true
    }
}

impl<O: Outbound> Drop for Conversation<O> {
    fn drop(&mut self) {
        self.close();
    }
}
