//! Persistence layer: PostgreSQL event log, container snapshots, and
//! durable ledger rows.
//!
//! The in-memory stores remain the source of truth at runtime; this
//! layer is write-behind. An event-log task subscribes to the
//! [`crate::domain::EventBus`] and appends every published event, and a
//! snapshot task periodically persists container state and prunes old
//! rows. The concrete implementation uses `sqlx::PgPool` for async
//! PostgreSQL access.

pub mod models;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::RecvError;

use crate::config::CoreConfig;
use crate::domain::{ContainerStore, CoreEvent, EventBus};
use postgres::PostgresPersistence;

/// Spawns the write-behind persistence tasks.
///
/// Started once at boot when persistence is enabled. The tasks run for
/// the lifetime of the process; persistence failures are logged and
/// never propagate back into request handling.
pub fn spawn_tasks(
    persistence: PostgresPersistence,
    event_bus: &EventBus,
    store: Arc<ContainerStore>,
    config: &CoreConfig,
) {
    if config.event_log_enabled {
        let mut receiver = event_bus.subscribe();
        let writer = persistence.clone();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        // Ledger postings also get a durable row of their
                        // own, with the serialization-conflict retry
                        // handled inside save_ledger_entry.
                        if let CoreEvent::EntryPosted { entry, .. } = &event {
                            if let Err(e) = writer.save_ledger_entry(entry).await {
                                tracing::error!(
                                    entry_id = %entry.entry_id,
                                    error = %e,
                                    "failed to persist ledger entry"
                                );
                            }
                        }
                        let payload = match serde_json::to_value(&event) {
                            Ok(v) => v,
                            Err(e) => {
                                tracing::error!(error = %e, "failed to serialize event");
                                continue;
                            }
                        };
                        let container_id = event.container_id().map(|id| *id.as_uuid());
                        if let Err(e) = writer
                            .save_event(container_id, event.event_type_str(), &payload)
                            .await
                        {
                            tracing::error!(error = %e, "failed to append event to log");
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event log writer lagged, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    let interval_secs = config.snapshot_interval_secs;
    let cleanup_after_days = config.cleanup_after_days;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        loop {
            ticker.tick().await;
            for container in store.snapshot_all().await {
                let state_json = match serde_json::to_value(&container) {
                    Ok(v) => v,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to serialize container state");
                        continue;
                    }
                };
                if let Err(e) = persistence
                    .save_snapshot(*container.container_id.as_uuid(), &state_json)
                    .await
                {
                    tracing::error!(
                        container_id = %container.container_id,
                        error = %e,
                        "failed to save container snapshot"
                    );
                }
            }
            if cleanup_after_days > 0 {
                match persistence.delete_old_snapshots(cleanup_after_days).await {
                    Ok(deleted) if deleted > 0 => {
                        tracing::info!(deleted, "pruned old container snapshots");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = %e, "snapshot cleanup failed"),
                }
            }
        }
    });
}
