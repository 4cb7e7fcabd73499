//! In-process record store

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use voice_coach_config::constants::records;
use voice_coach_core::{ExtractedRecord, RecordSink, Result};

#[derive(Debug)]
struct StoredRecord {
    record: ExtractedRecord,
    saved_at: Instant,
}

/// Latest record per session, held in memory
///
/// Outlives individual sessions but not the process. Entries age out after
/// the same TTL the Scylla table uses; expired entries are pruned on save.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, StoredRecord>>,
    ttl: Duration,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(records::TTL_SECS))
    }
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn is_expired(&self, stored: &StoredRecord) -> bool {
        stored.saved_at.elapsed() >= self.ttl
    }
}

#[async_trait]
impl RecordSink for InMemoryRecordStore {
    async fn save(&self, session_id: &str, record: &ExtractedRecord) -> Result<()> {
        let mut records = self.records.write();

        let before = records.len();
        records.retain(|_, stored| !self.is_expired(stored));
        let pruned = before - records.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Expired workout records pruned");
        }

        records.insert(
            session_id.to_string(),
            StoredRecord {
                record: record.clone(),
                saved_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn load(&self, session_id: &str) -> Result<Option<ExtractedRecord>> {
        Ok(self
            .records
            .read()
            .get(session_id)
            .filter(|stored| !self.is_expired(stored))
            .map(|stored| stored.record.clone()))
    }

    fn is_durable(&self) -> bool {
        false
    }
}
