//! Append-only tracking events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ContainerId, EventId};

/// Origin of a tracking event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSource {
    /// Entered by an authenticated operator.
    Manual,
    /// Delivered by the carrier webhook feed.
    Api,
}

/// A timestamped status update for a container.
///
/// Append-only: never mutated or reordered after creation. Uniqueness is
/// enforced at ingestion time by the ±60 s dedup window on
/// `(status, event_date)` per container.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEvent {
    /// Unique event identifier.
    pub event_id: EventId,
    /// Container this event belongs to (back-reference, not ownership).
    pub container_id: ContainerId,
    /// Free-text status label from the carrier feed or operator.
    pub status: String,
    /// Reported location, if any.
    pub location: Option<String>,
    /// Vessel name, if any.
    pub vessel_name: Option<String>,
    /// Free-text description, if any.
    pub description: Option<String>,
    /// When the event occurred (carrier time, not ingestion time).
    pub event_date: DateTime<Utc>,
    /// Where the event came from.
    pub source: EventSource,
    /// Whether the status label matched a terminal keyword.
    pub completed: bool,
    /// Reported latitude, if any.
    pub latitude: Option<f64>,
    /// Reported longitude, if any.
    pub longitude: Option<f64>,
}

impl TrackingEvent {
    /// Returns `true` if this event has the same status label and an
    /// `event_date` within `window_secs` of the given date. Used by the
    /// ingestion dedup check.
    #[must_use]
    pub fn matches(&self, status: &str, event_date: DateTime<Utc>, window_secs: i64) -> bool {
        self.status == status && (self.event_date - event_date).num_seconds().abs() <= window_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_event(status: &str, event_date: DateTime<Utc>) -> TrackingEvent {
        TrackingEvent {
            event_id: EventId::new(),
            container_id: ContainerId::new(),
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

    #[test]
    fn matches_within_window() {
        let now = Utc::now();
        let event = make_event("Departed Origin Port", now);
        assert!(event.matches("Departed Origin Port", now + Duration::seconds(10), 60));
        assert!(event.matches("Departed Origin Port", now - Duration::seconds(60), 60));
    }

    #[test]
    fn does_not_match_outside_window() {
        let now = Utc::now();
        let event = make_event("Departed Origin Port", now);
        assert!(!event.matches("Departed Origin Port", now + Duration::seconds(61), 60));
    }

    #[test]
    fn does_not_match_different_status() {
        let now = Utc::now();
        let event = make_event("Departed Origin Port", now);
        assert!(!event.matches("Arrived", now, 60));
    }
}
