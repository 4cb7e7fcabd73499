//! ScyllaDB schema creation

use crate::error::PersistenceError;
use scylla::Session;
use voice_coach_config::constants::records;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    // One partition per conversation, newest record first
    let records_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.workout_records (
            session_id TEXT,
            recorded_at_ms BIGINT,
            activity TEXT,
            duration_min INT,
            intensity TEXT,
            PRIMARY KEY ((session_id), recorded_at_ms)
        ) WITH CLUSTERING ORDER BY (recorded_at_ms DESC)
          AND default_time_to_live = {}
    "#,
        keyspace,
        records::TTL_SECS
    );

    session.query_unpaged(records_table, &[]).await.map_err(|e| {
        PersistenceError::SchemaError(format!("Failed to create workout_records table: {}", e))
    })?;

    Ok(())
}
