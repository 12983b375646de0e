//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{ContainerSnapshot, StoredEvent};
use crate::domain::LedgerEntry;
use crate::error::CoreError;

/// PostgreSQL error code for a transaction serialization failure.
const SERIALIZATION_FAILURE: &str = "40001";

/// PostgreSQL-backed persistence layer using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresPersistence {
    pool: PgPool,
}

impl PostgresPersistence {
    /// Creates a new persistence layer with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends an event to the event log.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError::PersistenceError`] on database failure.
    pub async fn save_event(
        &self,
        container_id: Option<Uuid>,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<i64, CoreError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO events (container_id, event_type, payload) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(container_id)
        .bind(event_type)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Saves a container state snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError::PersistenceError`] on database failure.
    pub async fn save_snapshot(
        &self,
        container_id: Uuid,
        state_json: &serde_json::Value,
    ) -> Result<i64, CoreError> {
        let row = sqlx::query_scalar::<_, i64>(
            "INSERT INTO container_snapshots (container_id, state_json) \
             VALUES ($1, $2) RETURNING id",
        )
        .bind(container_id)
        .bind(state_json)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;

        Ok(row)
    }

    /// Durably records a ledger entry, retrying once on a serialization
    /// conflict.
    ///
    /// The ledger rows carry the running balance, so concurrent writers
    /// against the same account can trip PostgreSQL's serializable
    /// isolation. The first `40001` is retried transparently; a second
    /// one surfaces as [`CoreError::ConcurrencyConflict`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConcurrencyConflict`] if both attempts hit a
    /// serialization failure, or [`CoreError::PersistenceError`] on any
    /// other database failure.
    pub async fn save_ledger_entry(&self, entry: &LedgerEntry) -> Result<i64, CoreError> {
        match self.insert_ledger_entry(entry).await {
            Err(CoreError::ConcurrencyConflict(_)) => {
                tracing::warn!(
                    entry_id = %entry.entry_id,
                    "serialization conflict on ledger insert, retrying"
                );
                self.insert_ledger_entry(entry).await
            }
            other => other,
        }
    }

    async fn insert_ledger_entry(&self, entry: &LedgerEntry) -> Result<i64, CoreError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO ledger_entries \
             (entry_id, user_id, shipment_id, description, entry_type, amount, balance, \
              created_by, transaction_date, notes, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING id",
        )
        .bind(entry.entry_id.as_uuid())
        .bind(entry.user_id.as_uuid())
        .bind(entry.shipment_id.map(|s| *s.as_uuid()))
        .bind(&entry.description)
        .bind(match entry.entry_type {
            crate::domain::EntryType::Debit => "DEBIT",
            crate::domain::EntryType::Credit => "CREDIT",
        })
        .bind(entry.amount)
        .bind(entry.balance)
        .bind(&entry.created_by)
        .bind(entry.transaction_date)
        .bind(&entry.notes)
        .bind(&entry.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(classify_db_error)
    }

    /// Loads the latest snapshot for each container using `DISTINCT ON`.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError::PersistenceError`] on database failure.
    pub async fn load_latest_snapshots(&self) -> Result<Vec<ContainerSnapshot>, CoreError> {
        let rows = sqlx::query_as::<_, (i64, Uuid, serde_json::Value, DateTime<Utc>)>(
            "SELECT DISTINCT ON (container_id) id, container_id, state_json, snapshot_at \
             FROM container_snapshots ORDER BY container_id, snapshot_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, container_id, state_json, snapshot_at)| ContainerSnapshot {
                id,
                container_id,
                state_json,
                snapshot_at,
            })
            .collect())
    }

    /// Loads events after the given timestamp, optionally filtered by
    /// container ID.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError::PersistenceError`] on database failure.
    pub async fn load_events_after(
        &self,
        after: DateTime<Utc>,
        container_id: Option<Uuid>,
    ) -> Result<Vec<StoredEvent>, CoreError> {
        let rows = if let Some(cid) = container_id {
            sqlx::query_as::<_, (i64, Option<Uuid>, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, container_id, event_type, payload, created_at FROM events \
                 WHERE created_at > $1 AND container_id = $2 ORDER BY created_at ASC",
            )
            .bind(after)
            .bind(cid)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, (i64, Option<Uuid>, String, serde_json::Value, DateTime<Utc>)>(
                "SELECT id, container_id, event_type, payload, created_at FROM events \
                 WHERE created_at > $1 ORDER BY created_at ASC",
            )
            .bind(after)
            .fetch_all(&self.pool)
            .await
        }
        .map_err(|e| CoreError::PersistenceError(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, container_id, event_type, payload, created_at)| StoredEvent {
                    id,
                    container_id,
                    event_type,
                    payload,
                    created_at,
                },
            )
            .collect())
    }

    /// Deletes snapshots older than the given number of days.
    ///
    /// # Errors
    ///
    /// Returns a [`CoreError::PersistenceError`] on database failure.
    pub async fn delete_old_snapshots(&self, before_days: u64) -> Result<u64, CoreError> {
        let cutoff = snapshot_cutoff(before_days, Utc::now());

        let result = sqlx::query("DELETE FROM container_snapshots WHERE snapshot_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| CoreError::PersistenceError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

/// Retention horizon for snapshot cleanup. The day count is capped at a
/// century so an absurd configuration value cannot overflow the date
/// arithmetic and panic the background task.
fn snapshot_cutoff(before_days: u64, now: DateTime<Utc>) -> DateTime<Utc> {
    const MAX_RETENTION_DAYS: i64 = 36_500;
    let days = i64::try_from(before_days).map_or(MAX_RETENTION_DAYS, |d| d.min(MAX_RETENTION_DAYS));
    now - chrono::Duration::days(days)
}

/// Maps a database error to the service taxonomy, distinguishing
/// serialization failures from everything else.
fn classify_db_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some(SERIALIZATION_FAILURE) {
            return CoreError::ConcurrencyConflict(db.message().to_string());
        }
    }
    CoreError::PersistenceError(err.to_string())
}
