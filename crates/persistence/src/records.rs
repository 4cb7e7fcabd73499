//! Workout record persistence using ScyllaDB

use async_trait::async_trait;
use chrono::Utc;

use voice_coach_core::{Activity, ExtractedRecord, Intensity, RecordSink, Result};

use crate::{PersistenceError, ScyllaClient};

/// ScyllaDB implementation of the record sink
///
/// Every save appends a row; `load` returns the newest one.
#[derive(Clone)]
pub struct ScyllaRecordStore {
    client: ScyllaClient,
}

impl ScyllaRecordStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }

    async fn insert(&self, session_id: &str, record: &ExtractedRecord) -> std::result::Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.workout_records (
                session_id, recorded_at_ms, activity, duration_min, intensity
            ) VALUES (?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        let duration = i32::try_from(record.duration)
            .map_err(|_| PersistenceError::InvalidData(format!("duration {} out of range", record.duration)))?;

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    session_id,
                    Utc::now().timestamp_millis(),
                    record.activity.as_str(),
                    duration,
                    record.intensity.as_str(),
                ),
            )
            .await?;

        tracing::debug!(
            session_id = %session_id,
            activity = %record.activity,
            duration = record.duration,
            "Workout record stored in ScyllaDB"
        );

        Ok(())
    }

    async fn latest(&self, session_id: &str) -> std::result::Result<Option<ExtractedRecord>, PersistenceError> {
        let query = format!(
            "SELECT activity, duration_min, intensity
             FROM {}.workout_records WHERE session_id = ? LIMIT 1",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                return Ok(Some(row_to_record(row)?));
            }
        }

        Ok(None)
    }
}

fn row_to_record(
    row: scylla::frame::response::result::Row,
) -> std::result::Result<ExtractedRecord, PersistenceError> {
    let (activity, duration, intensity): (String, i32, String) = row
        .into_typed()
        .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

    let duration = u32::try_from(duration)
        .map_err(|_| PersistenceError::InvalidData(format!("negative duration {}", duration)))?;

    ExtractedRecord::new(
        Activity::from_name(&activity),
        duration,
        Intensity::from_name(&intensity),
    )
    .map_err(|e| PersistenceError::InvalidData(e.to_string()))
}

#[async_trait]
impl RecordSink for ScyllaRecordStore {
    async fn save(&self, session_id: &str, record: &ExtractedRecord) -> Result<()> {
        Ok(self.insert(session_id, record).await?)
    }

    async fn load(&self, session_id: &str) -> Result<Option<ExtractedRecord>> {
        Ok(self.latest(session_id).await?)
    }

    fn is_durable(&self) -> bool {
        true
    }
}
