//! Concurrent container storage with per-container fine-grained locking.
//!
//! [`ContainerStore`] keeps every container in a `HashMap` where each
//! entry is individually protected by a [`tokio::sync::RwLock`]. Each
//! [`ContainerEntry`] bundles the container record with its append-only
//! event log, so the ingestion sequence (dedup check, append, progress
//! recompute) runs as a single atomic unit under one write lock.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::container::{Container, ContainerSummary};
use super::tracking_event::TrackingEvent;
use super::ContainerId;
use crate::error::CoreError;

/// A container record together with its append-only event log.
///
/// Events are only ever pushed; never mutated or reordered.
#[derive(Debug)]
pub struct ContainerEntry {
    /// The container record.
    pub container: Container,
    /// Append-only tracking event log, in insertion order.
    pub events: Vec<TrackingEvent>,
}

impl ContainerEntry {
    /// Wraps a container with an empty event log.
    #[must_use]
    pub const fn new(container: Container) -> Self {
        Self {
            container,
            events: Vec::new(),
        }
    }

    /// Finds an existing event with the same status label and an event
    /// date within `window_secs` of the given one.
    #[must_use]
    pub fn find_duplicate(
        &self,
        status: &str,
        event_date: chrono::DateTime<chrono::Utc>,
        window_secs: i64,
    ) -> Option<&TrackingEvent> {
        self.events
            .iter()
            .find(|e| e.matches(status, event_date, window_secs))
    }
}

/// Central store for all tracked containers.
///
/// Uses a `RwLock<HashMap<…>>` for the outer map, per-entry
/// `Arc<RwLock<ContainerEntry>>` for fine-grained locking, and a
/// secondary index from carrier tracking number to container ID for
/// webhook resolution.
///
/// # Concurrency
///
/// - Multiple tasks may read the same container concurrently.
/// - Writes to different containers are concurrent.
/// - Writes to the same container are serialized, which is what makes
///   the webhook dedup check race-free.
#[derive(Debug, Default)]
pub struct ContainerStore {
    containers: RwLock<HashMap<ContainerId, Arc<RwLock<ContainerEntry>>>>,
    by_tracking_number: RwLock<HashMap<String, ContainerId>>,
}

impl ContainerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new container.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRequest`] if the container ID or its
    /// tracking number is already registered.
    pub async fn insert(&self, container: Container) -> Result<ContainerId, CoreError> {
        let container_id = container.container_id;
        let tracking_number = container.tracking_number.clone();

        // Take both locks in a fixed order to keep the index consistent
        // with the map.
        let mut map = self.containers.write().await;
        let mut index = self.by_tracking_number.write().await;

        if map.contains_key(&container_id) {
            return Err(CoreError::InvalidRequest(format!(
                "container {container_id} already exists"
            )));
        }
        if let Some(trk) = &tracking_number {
            if index.contains_key(trk) {
                return Err(CoreError::InvalidRequest(format!(
                    "tracking number {trk} already assigned"
                )));
            }
        }

        map.insert(container_id, Arc::new(RwLock::new(ContainerEntry::new(container))));
        if let Some(trk) = tracking_number {
            index.insert(trk, container_id);
        }
        Ok(container_id)
    }

    /// Returns a shared reference to the entry behind its per-container
    /// lock.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ContainerNotFound`] if absent.
    pub async fn get(
        &self,
        container_id: ContainerId,
    ) -> Result<Arc<RwLock<ContainerEntry>>, CoreError> {
        let map = self.containers.read().await;
        map.get(&container_id)
            .cloned()
            .ok_or(CoreError::ContainerNotFound(*container_id.as_uuid()))
    }

    /// Resolves a carrier tracking number to a container ID.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TrackingNumberNotFound`] if no container
    /// carries the number.
    pub async fn resolve_tracking_number(
        &self,
        tracking_number: &str,
    ) -> Result<ContainerId, CoreError> {
        let index = self.by_tracking_number.read().await;
        index
            .get(tracking_number)
            .copied()
            .ok_or_else(|| CoreError::TrackingNumberNotFound(tracking_number.to_string()))
    }

    /// Returns summaries of all containers not yet closed. This is the
    /// batch entry point the external sync scheduler iterates.
    pub async fn list_active(&self) -> Vec<ContainerSummary> {
        let map = self.containers.read().await;
        let mut summaries = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            if entry.container.is_closed() {
                continue;
            }
            summaries.push(ContainerSummary::from(&entry.container));
        }
        summaries
    }

    /// Returns a cloned snapshot of every container record. Used by the
    /// read-side alert evaluator.
    pub async fn snapshot_all(&self) -> Vec<Container> {
        let map = self.containers.read().await;
        let mut snapshots = Vec::with_capacity(map.len());
        for entry_lock in map.values() {
            let entry = entry_lock.read().await;
            snapshots.push(entry.container.clone());
        }
        snapshots
    }

    /// Returns the number of containers in the store.
    pub async fn len(&self) -> usize {
        self.containers.read().await.len()
    }

    /// Returns `true` if the store contains no containers.
    pub async fn is_empty(&self) -> bool {
        self.containers.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ContainerStatus;

    fn make_container(tracking: Option<&str>) -> Container {
        Container::new(
            "MSKU1234567".to_string(),
            tracking.map(ToString::to_string),
        )
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = ContainerStore::new();
        let container = make_container(Some("TRK-1"));
        let id = container.container_id;

        let result = store.insert(container).await;
        assert!(result.is_ok());

        let fetched = store.get(id).await;
        assert!(fetched.is_ok());
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let store = ContainerStore::new();
        let result = store.get(ContainerId::new()).await;
        assert!(matches!(result, Err(CoreError::ContainerNotFound(_))));
    }

    #[tokio::test]
    async fn resolve_tracking_number_finds_container() {
        let store = ContainerStore::new();
        let container = make_container(Some("TRK-42"));
        let id = container.container_id;
        let _ = store.insert(container).await;

        let resolved = store.resolve_tracking_number("TRK-42").await;
        let Ok(resolved) = resolved else {
            panic!("expected resolution");
        };
        assert_eq!(resolved, id);
    }

    #[tokio::test]
    async fn unknown_tracking_number_is_not_found() {
        let store = ContainerStore::new();
        let result = store.resolve_tracking_number("NOPE").await;
        assert!(matches!(result, Err(CoreError::TrackingNumberNotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_tracking_number_rejected() {
        let store = ContainerStore::new();
        let _ = store.insert(make_container(Some("TRK-1"))).await;
        let result = store.insert(make_container(Some("TRK-1"))).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_active_excludes_closed() {
        let store = ContainerStore::new();
        let open = make_container(Some("TRK-1"));
        let mut closed = make_container(Some("TRK-2"));
        closed.status = ContainerStatus::Closed;

        let _ = store.insert(open).await;
        let _ = store.insert(closed).await;

        let active = store.list_active().await;
        assert_eq!(active.len(), 1);
    }

    #[tokio::test]
    async fn find_duplicate_respects_window() {
        let now = chrono::Utc::now();
        let container = make_container(None);
        let container_id = container.container_id;
        let mut entry = ContainerEntry::new(container);
        entry.events.push(TrackingEvent {
            event_id: crate::domain::EventId::new(),
            container_id,
            status: "Departed".to_string(),
            location: None,
            vessel_name: None,
            description: None,
            event_date: now,
            source: crate::domain::EventSource::Api,
            completed: false,
            latitude: None,
            longitude: None,
        });

        assert!(entry
            .find_duplicate("Departed", now + chrono::Duration::seconds(30), 60)
            .is_some());
        assert!(entry
            .find_duplicate("Departed", now + chrono::Duration::seconds(120), 60)
            .is_none());
        assert!(entry.find_duplicate("Arrived", now, 60).is_none());
    }
}
