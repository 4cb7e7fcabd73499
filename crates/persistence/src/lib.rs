//! Record persistence for the voice coach bridge
//!
//! Provides storage for the latest extracted workout record per session:
//! - `InMemoryRecordStore` (default, process lifetime)
//! - `ScyllaRecordStore` (durable, when persistence is enabled)

pub mod client;
pub mod error;
pub mod memory;
pub mod records;
pub mod schema;

pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use memory::InMemoryRecordStore;
pub use records::ScyllaRecordStore;

/// Connect to ScyllaDB, ensure the schema and return a durable record store
pub async fn init(config: ScyllaConfig) -> Result<ScyllaRecordStore, PersistenceError> {
    let client = ScyllaClient::connect(config).await?;
    client.ensure_schema().await?;
    Ok(ScyllaRecordStore::new(client))
}
