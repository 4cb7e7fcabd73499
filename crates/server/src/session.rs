//! Session Management
//!
//! A `Session` is one conversation: its lifecycle state, the records
//! extracted so far and its audio bridge. The `Registry` maps live session
//! ids to sessions and owns the record sink, which outlives them.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use voice_coach_config::constants::bridge;
use voice_coach_core::{AudioBridge, ExtractedRecord, RecordSink};

use crate::ServerError;

/// Conversation lifecycle
///
/// `Connecting -> Ready -> Active -> Ending -> Closed`. `Ready` may end
/// directly and every state may close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Connecting,
    Ready,
    Active,
    Ending,
    Closed,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Connecting, Ready)
                | (Ready, Active)
                | (Ready, Ending)
                | (Active, Ending)
                | (Connecting | Ready | Active | Ending, Closed)
        )
    }

    /// Accepts control traffic (`ping`, `get_data`, `stop`)
    pub fn is_open(self) -> bool {
        matches!(self, SessionState::Ready | SessionState::Active)
    }
}

/// Session state
pub struct Session {
    /// Session ID, also the client-visible conversation id
    pub id: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last activity
    last_activity: RwLock<Instant>,
    state: RwLock<SessionState>,
    records: RwLock<Vec<ExtractedRecord>>,
    bridge: Arc<AudioBridge>,
    /// Cleared once the client can no longer be reached
    live: AtomicBool,
}

impl Session {
    /// Create a new session in `Connecting`
    pub fn new(id: impl Into<String>, bridge: AudioBridge) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            last_activity: RwLock::new(Instant::now()),
            state: RwLock::new(SessionState::Connecting),
            records: RwLock::new(Vec::new()),
            bridge: Arc::new(bridge),
            live: AtomicBool::new(true),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Move to `next` if the lifecycle allows it
    ///
    /// Returns `false` and leaves the state alone otherwise, which makes
    /// repeated transitions (a second `start`, a second close) no-ops.
    pub fn transition(&self, next: SessionState) -> bool {
        let mut state = self.state.write();
        if !state.can_transition_to(next) {
            return false;
        }
        tracing::debug!(session_id = %self.id, from = ?*state, to = ?next, "Session transition");
        *state = next;
        true
    }

    pub fn bridge(&self) -> &Arc<AudioBridge> {
        &self.bridge
    }

    /// Append an extracted record
    pub fn push_record(&self, record: ExtractedRecord) {
        self.records.write().push(record);
    }

    pub fn last_record(&self) -> Option<ExtractedRecord> {
        self.records.read().last().cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    /// Update last activity
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    pub fn idle_secs(&self) -> u64 {
        self.last_activity.read().elapsed().as_secs()
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Mark the client unreachable
    pub fn mark_unreachable(&self) {
        if self.live.swap(false, Ordering::AcqRel) {
            tracing::debug!(session_id = %self.id, "Client unreachable");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("records", &self.record_count())
            .field("live", &self.is_live())
            .finish()
    }
}

/// Summary of a live session for listing
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub state: SessionState,
    pub created_at: DateTime<Utc>,
    pub records: usize,
    pub idle_secs: u64,
}

/// Session registry
pub struct Registry {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    max_sessions: usize,
    input_capacity: usize,
    output_capacity: usize,
    records: Arc<dyn RecordSink>,
}

impl Registry {
    /// Create a registry with default bridge capacities
    pub fn new(max_sessions: usize, records: Arc<dyn RecordSink>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            input_capacity: bridge::INPUT_CAPACITY,
            output_capacity: bridge::OUTPUT_CAPACITY,
            records,
        }
    }

    pub fn with_bridge_capacity(mut self, input: usize, output: usize) -> Self {
        self.input_capacity = input;
        self.output_capacity = output;
        self
    }

    /// Create and register a new session
    pub fn create(&self, id: impl Into<String>) -> Result<Arc<Session>, ServerError> {
        let id = id.into();
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            return Err(ServerError::Session("Max sessions reached".to_string()));
        }
        if sessions.contains_key(&id) {
            return Err(ServerError::Session(format!("Session {} already exists", id)));
        }

        let session = Arc::new(Session::new(
            &id,
            AudioBridge::new(self.input_capacity, self.output_capacity),
        ));
        sessions.insert(id.clone(), session.clone());

        tracing::info!(session_id = %id, active = sessions.len(), "Created session");
        Ok(session)
    }

    /// Get a session by ID
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    /// Remove a session; the record sink is left intact
    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        let removed = self.sessions.write().remove(id);
        if removed.is_some() {
            tracing::info!(session_id = %id, "Removed session");
        }
        removed
    }

    /// Get active session count
    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// List all session IDs
    pub fn list(&self) -> Vec<String> {
        self.sessions.read().keys().cloned().collect()
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> = self
            .sessions
            .read()
            .values()
            .map(|s| SessionSummary {
                session_id: s.id.clone(),
                state: s.state(),
                created_at: s.created_at,
                records: s.record_count(),
                idle_secs: s.idle_secs(),
            })
            .collect();
        summaries.sort_by_key(|s| s.created_at);
        summaries
    }

    /// Store a record as the session's latest
    ///
    /// Sink failures are logged; the live session keeps its own copy.
    pub async fn save_record(&self, id: &str, record: &ExtractedRecord) {
        if let Err(e) = self.records.save(id, record).await {
            tracing::warn!(session_id = %id, error = %e, "Failed to persist workout record");
        }
    }

    /// Latest record for a session, readable after the session is removed
    pub async fn last_record(&self, id: &str) -> Option<ExtractedRecord> {
        match self.records.load(id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(session_id = %id, error = %e, "Failed to load workout record");
                self.get(id).and_then(|s| s.last_record())
            },
        }
    }

    pub fn is_durable(&self) -> bool {
        self.records.is_durable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_coach_core::Activity;
    use voice_coach_persistence::InMemoryRecordStore;

    fn registry(max: usize) -> Registry {
        Registry::new(max, Arc::new(InMemoryRecordStore::new()))
    }

    #[test]
    fn test_session_creation() {
        let registry = registry(10);
        let session = registry.create("a").unwrap();

        assert_eq!(session.state(), SessionState::Connecting);
        assert!(session.is_live());
        assert!(session.bridge().is_active());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_session_get_and_remove() {
        let registry = registry(10);
        registry.create("a").unwrap();

        assert_eq!(registry.get("a").unwrap().id, "a");
        assert!(registry.remove("a").is_some());
        assert!(registry.get("a").is_none());
        assert!(registry.remove("a").is_none());
    }

    #[test]
    fn test_capacity_and_duplicates() {
        let registry = registry(1);
        registry.create("a").unwrap();
        assert!(matches!(registry.create("a"), Err(ServerError::Session(_))));
        assert!(matches!(registry.create("b"), Err(ServerError::Session(_))));

        registry.remove("a");
        assert!(registry.create("b").is_ok());
        assert_eq!(registry.list(), vec!["b".to_string()]);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let session = Session::new("s", AudioBridge::new(4, 4));

        assert!(!session.transition(SessionState::Active));
        assert!(session.transition(SessionState::Ready));
        assert!(session.transition(SessionState::Active));
        assert!(!session.transition(SessionState::Active));
        assert!(session.transition(SessionState::Ending));
        assert!(session.transition(SessionState::Closed));
        assert!(!session.transition(SessionState::Closed));
        assert!(!session.transition(SessionState::Ready));
    }

    #[test]
    fn test_ready_can_end_without_start() {
        assert!(SessionState::Ready.can_transition_to(SessionState::Ending));
        assert!(SessionState::Connecting.can_transition_to(SessionState::Closed));
        assert!(!SessionState::Connecting.can_transition_to(SessionState::Active));
    }

    #[tokio::test]
    async fn test_last_record_survives_removal() {
        let registry = registry(10);
        let session = registry.create("a").unwrap();
        let record = ExtractedRecord::new(Activity::Swimming, 40, None).unwrap();

        session.push_record(record.clone());
        registry.save_record("a", &record).await;
        registry.remove("a");

        assert_eq!(registry.last_record("a").await, Some(record));
        assert!(registry.last_record("missing").await.is_none());
    }
}
