//! Record sink trait

use async_trait::async_trait;

use crate::{ExtractedRecord, Result};

/// Persistence sink for extracted records, keyed by session id
///
/// Only the most recent record per session needs to be loadable; this store
/// outlives the session itself so clients can poll after disconnecting.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Store a record as the latest for the session
    async fn save(&self, session_id: &str, record: &ExtractedRecord) -> Result<()>;

    /// Load the latest record for the session
    async fn load(&self, session_id: &str) -> Result<Option<ExtractedRecord>>;

    /// Whether records survive a process restart
    fn is_durable(&self) -> bool;
}
