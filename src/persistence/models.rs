//! Database models for the event log and container snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored event row from the `events` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Container the event refers to, when applicable. Ledger events
    /// carry no container and store `NULL` here.
    pub container_id: Option<Uuid>,
    /// Event type discriminator (e.g. `"progress_updated"`).
    pub event_type: String,
    /// JSONB payload with event-specific data.
    pub payload: serde_json::Value,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A container snapshot row from the `container_snapshots` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    /// Auto-increment row ID.
    pub id: i64,
    /// Container that was snapshotted.
    pub container_id: Uuid,
    /// Full container record as JSONB.
    pub state_json: serde_json::Value,
    /// Snapshot timestamp.
    pub snapshot_at: DateTime<Utc>,
}
