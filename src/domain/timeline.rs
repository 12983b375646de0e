//! Milestone timeline projection.
//!
//! Pure, side-effect-free projector: given a container snapshot and its
//! ordered tracking events, produces the fixed sequence of milestone
//! stages the UI renders as a progress strip. Stage presence and
//! completion are a function of the container's authoritative fields and
//! status only; events merely supply dates for stages that have no
//! authoritative date field.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::container::{Container, ContainerStatus};
use super::tracking_event::TrackingEvent;

/// Fixed milestone identifiers, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageKind {
    /// Record opened.
    Created,
    /// Waiting for cargo loading.
    WaitingForLoading,
    /// Cargo loaded.
    Loaded,
    /// On the water.
    InTransit,
    /// Arrived at destination port (actual arrival known).
    ArrivedPort,
    /// Estimated arrival stage shown while no actual arrival exists.
    Arriving,
    /// Customs clearance.
    CustomsClearance,
    /// Released by customs.
    Released,
    /// Closed.
    Closed,
}

impl StageKind {
    /// Wire-format label (`SCREAMING_SNAKE_CASE`), matching the serde
    /// representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::WaitingForLoading => "WAITING_FOR_LOADING",
            Self::Loaded => "LOADED",
            Self::InTransit => "IN_TRANSIT",
            Self::ArrivedPort => "ARRIVED_PORT",
            Self::Arriving => "ARRIVING",
            Self::CustomsClearance => "CUSTOMS_CLEARANCE",
            Self::Released => "RELEASED",
            Self::Closed => "CLOSED",
        }
    }
}

/// One milestone stage in the timeline.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineStage {
    /// Which milestone this is.
    pub stage: StageKind,
    /// Best-known date for the milestone, if any.
    pub date: Option<DateTime<Utc>>,
    /// Whether the milestone has been passed.
    pub completed: bool,
    /// `true` only for the [`StageKind::Arriving`] ETA stage.
    pub estimated: bool,
}

impl TimelineStage {
    fn new(stage: StageKind, date: Option<DateTime<Utc>>, completed: bool) -> Self {
        Self {
            stage,
            date,
            completed,
            estimated: false,
        }
    }
}

/// Earliest event whose status label contains any of the keywords
/// (case-insensitive). Supplies dates for stages without an
/// authoritative container field.
fn event_date_for(events: &[TrackingEvent], keywords: &[&str]) -> Option<DateTime<Utc>> {
    events
        .iter()
        .filter(|e| {
            let lower = e.status.to_lowercase();
            keywords.iter().any(|kw| lower.contains(kw))
        })
        .map(|e| e.event_date)
        .min()
}

/// Builds the milestone timeline for a container snapshot.
///
/// Stages whose presence precondition is unmet are omitted entirely,
/// never emitted as incomplete. Supplying the same snapshot twice always
/// yields an identical stage list.
#[must_use]
pub fn build_timeline(container: &Container, events: &[TrackingEvent]) -> Vec<TimelineStage> {
    use ContainerStatus as S;

    let status = container.status;
    let mut stages = Vec::with_capacity(8);

    // 1. Created: always present and always done.
    stages.push(TimelineStage::new(
        StageKind::Created,
        Some(container.created_at),
        true,
    ));

    // 2. Waiting for loading: present once the status has left Created.
    if status.has_reached(S::WaitingForLoading) {
        stages.push(TimelineStage::new(
            StageKind::WaitingForLoading,
            event_date_for(events, &["waiting", "booking"]),
            status != S::WaitingForLoading,
        ));
    }

    // 3. Loaded: present once a loading date is known.
    if let Some(loading_date) = container.loading_date {
        stages.push(TimelineStage::new(
            StageKind::Loaded,
            Some(loading_date),
            status.has_reached(S::Loaded),
        ));
    }

    // 4. In transit: present once a departure date is known.
    if let Some(departure_date) = container.departure_date {
        stages.push(TimelineStage::new(
            StageKind::InTransit,
            Some(departure_date),
            status.has_reached(S::InTransit),
        ));
    }

    // 5. Arrival: actual arrival when known, otherwise an estimated
    //    ETA stage that is never marked completed.
    if let Some(actual) = container.actual_arrival {
        stages.push(TimelineStage::new(
            StageKind::ArrivedPort,
            Some(actual),
            status.has_reached(S::ArrivedPort),
        ));
    } else if let Some(eta) = container.estimated_arrival {
        stages.push(TimelineStage {
            stage: StageKind::Arriving,
            date: Some(eta),
            completed: false,
            estimated: true,
        });
    }

    // 6. Customs clearance.
    if status.has_reached(S::CustomsClearance) {
        stages.push(TimelineStage::new(
            StageKind::CustomsClearance,
            event_date_for(events, &["customs"]),
            status.has_reached(S::Released),
        ));
    }

    // 7. Released: always completed when present.
    if status.has_reached(S::Released) {
        stages.push(TimelineStage::new(
            StageKind::Released,
            event_date_for(events, &["released", "cleared"]),
            true,
        ));
    }

    // 8. Closed.
    if status == S::Closed {
        stages.push(TimelineStage::new(
            StageKind::Closed,
            event_date_for(events, &["closed"]),
            true,
        ));
    }

    stages
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ContainerId, EventId, EventSource};
    use chrono::Duration;

    fn make_container(status: ContainerStatus) -> Container {
        let mut c = Container::new("MSKU1234567".to_string(), None);
        c.status = status;
        c
    }

    fn make_event(container_id: ContainerId, status: &str, event_date: DateTime<Utc>) -> TrackingEvent {
        TrackingEvent {
            event_id: EventId::new(),
            container_id,
            status: status.to_string(),
            location: None,
            vessel_name: None,
            description: None,
            event_date,
            source: EventSource::Api,
            completed: false,
            latitude: None,
            longitude: None,
        }
    }

    fn kinds(stages: &[TimelineStage]) -> Vec<StageKind> {
        stages.iter().map(|s| s.stage).collect()
    }

    #[test]
    fn fresh_container_shows_only_created() {
        let container = make_container(ContainerStatus::Created);
        let stages = build_timeline(&container, &[]);
        assert_eq!(kinds(&stages), vec![StageKind::Created]);
        let Some(first) = stages.first() else {
            panic!("created stage expected");
        };
        assert!(first.completed);
    }

    #[test]
    fn waiting_stage_incomplete_while_current() {
        let container = make_container(ContainerStatus::WaitingForLoading);
        let stages = build_timeline(&container, &[]);
        assert_eq!(
            kinds(&stages),
            vec![StageKind::Created, StageKind::WaitingForLoading]
        );
        let Some(waiting) = stages.last() else {
            panic!("waiting stage expected");
        };
        assert!(!waiting.completed);
    }

    #[test]
    fn in_transit_with_eta_emits_estimated_arriving() {
        // IN_TRANSIT, loading + departure set, no actual arrival, ETA
        // in two days.
        let now = Utc::now();
        let mut container = make_container(ContainerStatus::InTransit);
        container.loading_date = Some(now - Duration::days(5));
        container.departure_date = Some(now - Duration::days(3));
        container.estimated_arrival = Some(now + Duration::days(2));

        let stages = build_timeline(&container, &[]);
        assert_eq!(
            kinds(&stages),
            vec![
                StageKind::Created,
                StageKind::WaitingForLoading,
                StageKind::Loaded,
                StageKind::InTransit,
                StageKind::Arriving,
            ]
        );
        for stage in stages.iter().take(4) {
            assert!(stage.completed, "{:?} should be done", stage.stage);
        }
        let Some(arriving) = stages.last() else {
            panic!("arriving stage expected");
        };
        assert!(!arriving.completed);
        assert!(arriving.estimated);
    }

    #[test]
    fn actual_arrival_replaces_estimated_stage() {
        let now = Utc::now();
        let mut container = make_container(ContainerStatus::ArrivedPort);
        container.loading_date = Some(now - Duration::days(10));
        container.departure_date = Some(now - Duration::days(8));
        container.estimated_arrival = Some(now - Duration::days(1));
        container.actual_arrival = Some(now);

        let stages = build_timeline(&container, &[]);
        assert!(kinds(&stages).contains(&StageKind::ArrivedPort));
        assert!(!kinds(&stages).contains(&StageKind::Arriving));
    }

    #[test]
    fn closed_container_emits_full_strip() {
        let now = Utc::now();
        let mut container = make_container(ContainerStatus::Closed);
        container.loading_date = Some(now - Duration::days(30));
        container.departure_date = Some(now - Duration::days(25));
        container.actual_arrival = Some(now - Duration::days(10));

        let id = container.container_id;
        let events = vec![
            make_event(id, "Customs inspection started", now - Duration::days(9)),
            make_event(id, "Cargo released", now - Duration::days(7)),
        ];

        let stages = build_timeline(&container, &events);
        assert_eq!(
            kinds(&stages),
            vec![
                StageKind::Created,
                StageKind::WaitingForLoading,
                StageKind::Loaded,
                StageKind::InTransit,
                StageKind::ArrivedPort,
                StageKind::CustomsClearance,
                StageKind::Released,
                StageKind::Closed,
            ]
        );
        assert!(stages.iter().all(|s| s.completed));

        // Event-derived dates flow into the stages without an
        // authoritative container field.
        let customs = stages.iter().find(|s| s.stage == StageKind::CustomsClearance);
        let Some(customs) = customs else {
            panic!("customs stage expected");
        };
        assert_eq!(customs.date, Some(now - Duration::days(9)));
    }

    #[test]
    fn projection_is_deterministic() {
        let now = Utc::now();
        let mut container = make_container(ContainerStatus::InTransit);
        container.loading_date = Some(now - Duration::days(4));
        container.departure_date = Some(now - Duration::days(2));
        container.estimated_arrival = Some(now + Duration::days(3));

        let first = build_timeline(&container, &[]);
        let second = build_timeline(&container, &[]);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.stage, b.stage);
            assert_eq!(a.completed, b.completed);
            assert_eq!(a.date, b.date);
            assert_eq!(a.estimated, b.estimated);
        }
    }

    #[test]
    fn stage_without_precondition_is_omitted_not_incomplete() {
        // In transit but no loading date recorded: the Loaded stage is
        // absent entirely.
        let now = Utc::now();
        let mut container = make_container(ContainerStatus::InTransit);
        container.departure_date = Some(now - Duration::days(1));

        let stages = build_timeline(&container, &[]);
        assert!(!kinds(&stages).contains(&StageKind::Loaded));
    }
}
