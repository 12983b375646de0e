//! Tracking service: container lifecycle and webhook ingestion.
//!
//! Owns the authoritative container status/progress and the append-only
//! event log. Every ingestion runs dedup check, append, and progress
//! recompute under the container's write lock, so two near-simultaneous
//! deliveries of the same event cannot both pass the dedup check.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::domain::container_store::ContainerEntry;
use crate::domain::{
    build_timeline, progress, Container, ContainerId, ContainerStatus, ContainerStore,
    ContainerSummary, CoreEvent, EventBus, EventId, EventSource, TimelineStage, TrackingEvent,
};
use crate::error::CoreError;
use crate::reports::alerts::{self, DeliveryAlert};

/// Inbound tracking signal, decoded from a webhook or manual entry.
#[derive(Debug, Clone)]
pub struct TrackingSignal {
    /// Free-text status label.
    pub status: String,
    /// When the event occurred.
    pub event_date: DateTime<Utc>,
    /// Reported location, if any.
    pub location: Option<String>,
    /// Vessel name, if any.
    pub vessel_name: Option<String>,
    /// Free-text description, if any.
    pub description: Option<String>,
    /// Reported latitude, if any.
    pub latitude: Option<f64>,
    /// Reported longitude, if any.
    pub longitude: Option<f64>,
}

/// Result of an ingestion attempt.
///
/// `Duplicate` is a successful idempotent no-op, not an error: the
/// upstream webhook sender retries deliveries and every retry must
/// report success.
#[derive(Debug, Clone)]
pub enum IngestOutcome {
    /// A new event was appended and progress recomputed.
    Recorded {
        /// The stored event.
        event: TrackingEvent,
        /// Container progress after the signal.
        progress: u8,
        /// Whether the signal was terminal.
        terminal: bool,
    },
    /// An equivalent event already exists; nothing was written.
    Duplicate {
        /// The previously stored event.
        event_id: EventId,
    },
}

/// Orchestration layer for container tracking.
///
/// Stateless coordinator: owns references to [`ContainerStore`] for
/// state and [`EventBus`] for event emission. Every mutation follows the
/// pattern: acquire the container lock, mutate, release, emit events.
#[derive(Debug, Clone)]
pub struct TrackingService {
    store: Arc<ContainerStore>,
    event_bus: EventBus,
    dedup_window_secs: i64,
    warning_window: Duration,
}

impl TrackingService {
    /// Creates a new `TrackingService`.
    #[must_use]
    pub fn new(
        store: Arc<ContainerStore>,
        event_bus: EventBus,
        dedup_window_secs: i64,
        warning_window: Duration,
    ) -> Self {
        Self {
            store,
            event_bus,
            dedup_window_secs,
            warning_window,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns a reference to the inner [`ContainerStore`].
    #[must_use]
    pub fn store(&self) -> &Arc<ContainerStore> {
        &self.store
    }

    /// Opens a new container record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRequest`] if the container number is
    /// empty or the tracking number is already assigned.
    pub async fn register_container(
        &self,
        container_number: String,
        tracking_number: Option<String>,
        estimated_arrival: Option<DateTime<Utc>>,
    ) -> Result<Container, CoreError> {
        if container_number.trim().is_empty() {
            return Err(CoreError::InvalidRequest(
                "container_number must not be empty".to_string(),
            ));
        }
        let mut container = Container::new(container_number, tracking_number);
        container.estimated_arrival = estimated_arrival;
        let snapshot = container.clone();
        let container_id = self.store.insert(container).await?;

        tracing::info!(%container_id, container_number = %snapshot.container_number, "container registered");
        Ok(snapshot)
    }

    /// Ingests a webhook delivery identified by carrier tracking number.
    ///
    /// Resolution, dedup check, append, and progress recompute are
    /// applied as one atomic unit under the container's write lock.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TrackingNumberNotFound`] if no container
    /// carries the tracking number, or [`CoreError::InvalidRequest`] if
    /// the status label is empty.
    pub async fn ingest_webhook(
        &self,
        tracking_number: &str,
        signal: TrackingSignal,
    ) -> Result<IngestOutcome, CoreError> {
        let container_id = self.store.resolve_tracking_number(tracking_number).await?;
        self.record_event(container_id, signal, EventSource::Api)
            .await
    }

    /// Records a manually entered tracking event. Same dedup and
    /// recompute rules as webhook ingestion, with `source = Manual`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ContainerNotFound`] if the container does
    /// not exist, or [`CoreError::InvalidRequest`] on an empty status.
    pub async fn record_manual_event(
        &self,
        container_id: ContainerId,
        signal: TrackingSignal,
    ) -> Result<IngestOutcome, CoreError> {
        self.record_event(container_id, signal, EventSource::Manual)
            .await
    }

    async fn record_event(
        &self,
        container_id: ContainerId,
        signal: TrackingSignal,
        source: EventSource,
    ) -> Result<IngestOutcome, CoreError> {
        if signal.status.trim().is_empty() {
            return Err(CoreError::InvalidRequest(
                "event status must not be empty".to_string(),
            ));
        }

        let entry_lock = self.store.get(container_id).await?;
        let mut entry = entry_lock.write().await;

        if let Some(existing) = entry.find_duplicate(
            &signal.status,
            signal.event_date,
            self.dedup_window_secs,
        ) {
            let event_id = existing.event_id;
            drop(entry);
            tracing::debug!(%container_id, %event_id, "duplicate tracking event ignored");
            return Ok(IngestOutcome::Duplicate { event_id });
        }

        let terminal = progress::is_terminal(&signal.status);
        let event = TrackingEvent {
            event_id: EventId::new(),
            container_id,
            status: signal.status.clone(),
            location: signal.location.clone(),
            vessel_name: signal.vessel_name,
            description: signal.description,
            event_date: signal.event_date,
            source,
            completed: terminal,
            latitude: signal.latitude,
            longitude: signal.longitude,
        };
        entry.events.push(event.clone());

        let (old_progress, new_progress) =
            apply_signal_locked(&mut entry, &signal.status, signal.location.as_deref());

        drop(entry);

        let now = Utc::now();
        let _ = self.event_bus.publish(CoreEvent::EventRecorded {
            container_id,
            event_id: event.event_id,
            status: event.status.clone(),
            event_date: event.event_date,
            timestamp: now,
        });
        if old_progress != new_progress {
            let _ = self.event_bus.publish(CoreEvent::ProgressUpdated {
                container_id,
                old_progress,
                new_progress,
                timestamp: now,
            });
        }
        if terminal {
            let _ = self.event_bus.publish(CoreEvent::ContainerTerminal {
                container_id,
                status: event.status.clone(),
                timestamp: now,
            });
        }

        tracing::info!(
            %container_id,
            status = %event.status,
            progress = new_progress,
            terminal,
            "tracking event recorded"
        );

        Ok(IngestOutcome::Recorded {
            event,
            progress: new_progress,
            terminal,
        })
    }

    /// Applies a raw status label to a container's progress and location
    /// without appending an event. Exposed for producers that update
    /// state outside the webhook path.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ContainerNotFound`] if the container does
    /// not exist.
    pub async fn apply_tracking_signal(
        &self,
        container_id: ContainerId,
        status_label: &str,
        location: Option<&str>,
    ) -> Result<(u8, bool), CoreError> {
        let entry_lock = self.store.get(container_id).await?;
        let mut entry = entry_lock.write().await;
        let (old_progress, new_progress) = apply_signal_locked(&mut entry, status_label, location);
        let terminal = progress::is_terminal(status_label);
        drop(entry);

        if old_progress != new_progress {
            let _ = self.event_bus.publish(CoreEvent::ProgressUpdated {
                container_id,
                old_progress,
                new_progress,
                timestamp: Utc::now(),
            });
        }
        Ok((new_progress, terminal))
    }

    /// Applies an explicit lifecycle status change from the CRUD layer.
    ///
    /// The lifecycle is forward-only: a change to an earlier status is
    /// rejected. Reaching `Loaded`, `InTransit`, or `ArrivedPort` stamps
    /// the corresponding date field if it is not already set.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ContainerNotFound`] if the container does
    /// not exist, or [`CoreError::StatusRegression`] on a backward
    /// transition.
    pub async fn set_status(
        &self,
        container_id: ContainerId,
        new_status: ContainerStatus,
        occurred_at: Option<DateTime<Utc>>,
    ) -> Result<Container, CoreError> {
        let entry_lock = self.store.get(container_id).await?;
        let mut entry = entry_lock.write().await;

        let from = entry.container.status;
        if new_status.rank() < from.rank() {
            return Err(CoreError::StatusRegression {
                from,
                to: new_status,
            });
        }
        if new_status == from {
            return Ok(entry.container.clone());
        }

        let when = occurred_at.unwrap_or_else(Utc::now);
        entry.container.status = new_status;
        match new_status {
            ContainerStatus::Loaded => {
                entry.container.loading_date.get_or_insert(when);
            }
            ContainerStatus::InTransit => {
                entry.container.departure_date.get_or_insert(when);
            }
            ContainerStatus::ArrivedPort => {
                entry.container.actual_arrival.get_or_insert(when);
            }
            _ => {}
        }
        let snapshot = entry.container.clone();
        drop(entry);

        let _ = self.event_bus.publish(CoreEvent::StatusChanged {
            container_id,
            from,
            to: new_status,
            timestamp: Utc::now(),
        });
        tracing::info!(%container_id, %from, to = %new_status, "container status changed");
        Ok(snapshot)
    }

    /// Returns a cloned snapshot of the container record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ContainerNotFound`] if absent.
    pub async fn container(&self, container_id: ContainerId) -> Result<Container, CoreError> {
        let entry_lock = self.store.get(container_id).await?;
        let entry = entry_lock.read().await;
        Ok(entry.container.clone())
    }

    /// Builds the milestone timeline for a container.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ContainerNotFound`] if absent.
    pub async fn timeline(&self, container_id: ContainerId) -> Result<Vec<TimelineStage>, CoreError> {
        let entry_lock = self.store.get(container_id).await?;
        let entry = entry_lock.read().await;
        Ok(build_timeline(&entry.container, &entry.events))
    }

    /// Returns summaries of all containers not yet closed, for the
    /// external sync scheduler.
    pub async fn list_active(&self) -> Vec<ContainerSummary> {
        self.store.list_active().await
    }

    /// Evaluates delivery alerts over the current container snapshot.
    pub async fn delivery_alerts(&self, now: DateTime<Utc>) -> Vec<DeliveryAlert> {
        let snapshot = self.store.snapshot_all().await;
        alerts::evaluate(&snapshot, now, self.warning_window)
    }
}

/// Updates progress, location, and last-update timestamp from a status
/// label. The caller holds the container's write lock.
fn apply_signal_locked(
    entry: &mut ContainerEntry,
    status_label: &str,
    location: Option<&str>,
) -> (u8, u8) {
    let old_progress = entry.container.progress;
    let new_progress = progress::progress_for(status_label);
    entry.container.progress = new_progress;
    entry.container.last_location_update = Some(Utc::now());
    if let Some(loc) = location {
        if !loc.trim().is_empty() {
            entry.container.current_location = Some(loc.to_string());
        }
    }
    (old_progress, new_progress)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_signal(status: &str, event_date: DateTime<Utc>) -> TrackingSignal {
        TrackingSignal {
            status: status.to_string(),
            event_date,
            location: Some("Rotterdam".to_string()),
            vessel_name: None,
            description: None,
            latitude: None,
            longitude: None,
        }
    }

    fn make_service() -> TrackingService {
        TrackingService::new(
            Arc::new(ContainerStore::new()),
            EventBus::new(1000),
            60,
            Duration::days(3),
        )
    }

    async fn register(service: &TrackingService, tracking: &str) -> Container {
        let result = service
            .register_container("MSKU1234567".to_string(), Some(tracking.to_string()), None)
            .await;
        let Ok(container) = result else {
            panic!("registration failed");
        };
        container
    }

    #[tokio::test]
    async fn webhook_appends_event_and_updates_progress() {
        let service = make_service();
        let container = register(&service, "TRK-1").await;

        let outcome = service
            .ingest_webhook("TRK-1", make_signal("Departed Origin Port", Utc::now()))
            .await;
        let Ok(IngestOutcome::Recorded {
            progress, terminal, ..
        }) = outcome
        else {
            panic!("expected recorded outcome");
        };
        assert_eq!(progress, 40);
        assert!(!terminal);

        let updated = service.container(container.container_id).await;
        let Ok(updated) = updated else {
            panic!("container lookup failed");
        };
        assert_eq!(updated.progress, 40);
        assert_eq!(updated.current_location.as_deref(), Some("Rotterdam"));
        assert!(updated.last_location_update.is_some());
    }

    #[tokio::test]
    async fn duplicate_within_window_is_noop() {
        let service = make_service();
        let container = register(&service, "TRK-1").await;
        let now = Utc::now();

        let first = service
            .ingest_webhook("TRK-1", make_signal("Departed Origin Port", now))
            .await;
        assert!(matches!(first, Ok(IngestOutcome::Recorded { .. })));

        // Second delivery ten seconds later: no new event.
        let second = service
            .ingest_webhook(
                "TRK-1",
                make_signal("Departed Origin Port", now + Duration::seconds(10)),
            )
            .await;
        assert!(matches!(second, Ok(IngestOutcome::Duplicate { .. })));

        let entry_lock = service.store().get(container.container_id).await;
        let Ok(entry_lock) = entry_lock else {
            panic!("container lookup failed");
        };
        assert_eq!(entry_lock.read().await.events.len(), 1);
    }

    #[tokio::test]
    async fn same_status_outside_window_is_new_event() {
        let service = make_service();
        let container = register(&service, "TRK-1").await;
        let now = Utc::now();

        let _ = service
            .ingest_webhook("TRK-1", make_signal("In transit", now))
            .await;
        let outcome = service
            .ingest_webhook("TRK-1", make_signal("In transit", now + Duration::minutes(5)))
            .await;
        assert!(matches!(outcome, Ok(IngestOutcome::Recorded { .. })));

        let entry_lock = service.store().get(container.container_id).await;
        let Ok(entry_lock) = entry_lock else {
            panic!("container lookup failed");
        };
        assert_eq!(entry_lock.read().await.events.len(), 2);
    }

    #[tokio::test]
    async fn unknown_tracking_number_is_reported() {
        let service = make_service();
        let result = service
            .ingest_webhook("UNKNOWN", make_signal("Departed", Utc::now()))
            .await;
        assert!(matches!(
            result,
            Err(CoreError::TrackingNumberNotFound(_))
        ));
    }

    #[tokio::test]
    async fn terminal_signal_publishes_terminal_event() {
        let service = make_service();
        let _ = register(&service, "TRK-1").await;
        let mut rx = service.event_bus().subscribe();

        let outcome = service
            .ingest_webhook("TRK-1", make_signal("Delivered to consignee", Utc::now()))
            .await;
        let Ok(IngestOutcome::Recorded { terminal, .. }) = outcome else {
            panic!("expected recorded outcome");
        };
        assert!(terminal);

        let mut saw_terminal = false;
        while let Ok(event) = rx.try_recv() {
            if event.event_type_str() == "container_terminal" {
                saw_terminal = true;
            }
        }
        assert!(saw_terminal);
    }

    #[tokio::test]
    async fn concurrent_duplicate_deliveries_store_one_event() {
        let service = make_service();
        let container = register(&service, "TRK-1").await;
        let now = Utc::now();

        let mut handles = Vec::new();
        for i in 0..8 {
            let service = service.clone();
            let signal = make_signal("Departed Origin Port", now + Duration::seconds(i));
            handles.push(tokio::spawn(async move {
                service.ingest_webhook("TRK-1", signal).await
            }));
        }
        let mut recorded = 0;
        for handle in handles {
            let Ok(Ok(outcome)) = handle.await else {
                panic!("delivery task failed");
            };
            if matches!(outcome, IngestOutcome::Recorded { .. }) {
                recorded += 1;
            }
        }
        assert_eq!(recorded, 1);

        let entry_lock = service.store().get(container.container_id).await;
        let Ok(entry_lock) = entry_lock else {
            panic!("container lookup failed");
        };
        assert_eq!(entry_lock.read().await.events.len(), 1);
    }

    #[tokio::test]
    async fn apply_signal_updates_progress_without_appending() {
        let service = make_service();
        let container = register(&service, "TRK-1").await;
        let id = container.container_id;

        let result = service
            .apply_tracking_signal(id, "Cargo released", Some("Hamburg"))
            .await;
        let Ok((progress, terminal)) = result else {
            panic!("signal application failed");
        };
        assert_eq!(progress, 90);
        assert!(terminal);

        let entry_lock = service.store().get(id).await;
        let Ok(entry_lock) = entry_lock else {
            panic!("container lookup failed");
        };
        let entry = entry_lock.read().await;
        assert!(entry.events.is_empty());
        assert_eq!(entry.container.current_location.as_deref(), Some("Hamburg"));
    }

    #[tokio::test]
    async fn status_regression_rejected() {
        let service = make_service();
        let container = register(&service, "TRK-1").await;
        let id = container.container_id;

        let result = service
            .set_status(id, ContainerStatus::InTransit, None)
            .await;
        assert!(result.is_ok());

        let regression = service.set_status(id, ContainerStatus::Loaded, None).await;
        assert!(matches!(
            regression,
            Err(CoreError::StatusRegression { .. })
        ));
    }

    #[tokio::test]
    async fn status_change_stamps_dates() {
        let service = make_service();
        let container = register(&service, "TRK-1").await;
        let id = container.container_id;
        let when = Utc::now() - Duration::days(1);

        let result = service
            .set_status(id, ContainerStatus::Loaded, Some(when))
            .await;
        let Ok(updated) = result else {
            panic!("status change failed");
        };
        assert_eq!(updated.loading_date, Some(when));

        // Already-set dates are not overwritten.
        let result = service.set_status(id, ContainerStatus::InTransit, None).await;
        let Ok(updated) = result else {
            panic!("status change failed");
        };
        assert_eq!(updated.loading_date, Some(when));
        assert!(updated.departure_date.is_some());
    }

    #[tokio::test]
    async fn empty_status_label_rejected() {
        let service = make_service();
        let _ = register(&service, "TRK-1").await;
        let result = service
            .ingest_webhook("TRK-1", make_signal("  ", Utc::now()))
            .await;
        assert!(matches!(result, Err(CoreError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn blank_location_leaves_current_location_unchanged() {
        let service = make_service();
        let container = register(&service, "TRK-1").await;
        let now = Utc::now();

        let _ = service
            .ingest_webhook("TRK-1", make_signal("Loaded on vessel", now))
            .await;

        let mut signal = make_signal("Departed", now + Duration::hours(1));
        signal.location = Some("  ".to_string());
        let _ = service.ingest_webhook("TRK-1", signal).await;

        let updated = service.container(container.container_id).await;
        let Ok(updated) = updated else {
            panic!("container lookup failed");
        };
        assert_eq!(updated.current_location.as_deref(), Some("Rotterdam"));
    }

    #[tokio::test]
    async fn timeline_reflects_ingested_state() {
        let service = make_service();
        let container = register(&service, "TRK-1").await;
        let id = container.container_id;

        let _ = service
            .set_status(id, ContainerStatus::InTransit, None)
            .await;
        let stages = service.timeline(id).await;
        let Ok(stages) = stages else {
            panic!("timeline failed");
        };
        assert!(stages.len() >= 3);
    }
}
