//! Container entity and lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ContainerId;

/// Lifecycle status of a container.
///
/// A strictly forward-moving sequence in normal operation. The numeric
/// [`rank`](Self::rank) defines the ordering used to reject regressions
/// and to derive timeline completion flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerStatus {
    /// Record opened, nothing booked yet.
    Created,
    /// Booked, waiting for cargo loading.
    WaitingForLoading,
    /// Cargo loaded at origin.
    Loaded,
    /// On the water.
    InTransit,
    /// Arrived at destination port.
    ArrivedPort,
    /// Under customs clearance.
    CustomsClearance,
    /// Released by customs.
    Released,
    /// Logically closed (never deleted).
    Closed,
}

impl ContainerStatus {
    /// Ordinal position in the forward-only lifecycle.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Created => 0,
            Self::WaitingForLoading => 1,
            Self::Loaded => 2,
            Self::InTransit => 3,
            Self::ArrivedPort => 4,
            Self::CustomsClearance => 5,
            Self::Released => 6,
            Self::Closed => 7,
        }
    }

    /// Returns `true` if this status is at or past `other` in the
    /// lifecycle sequence.
    #[must_use]
    pub const fn has_reached(self, other: Self) -> bool {
        self.rank() >= other.rank()
    }

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
            Self::CustomsClearance => "CUSTOMS_CLEARANCE",
            Self::Released => "RELEASED",
            Self::Closed => "CLOSED",
        }
    }
}

impl std::fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked shipping container.
///
/// Owned exclusively by the lifecycle engine; mutated only through event
/// ingestion or explicit status-changing operations from the CRUD layer.
#[derive(Debug, Clone, Serialize)]
pub struct Container {
    /// Unique identifier (immutable after creation).
    pub container_id: ContainerId,
    /// Business identifier printed on the container.
    pub container_number: String,
    /// Carrier tracking number used to correlate inbound webhooks.
    pub tracking_number: Option<String>,
    /// Current lifecycle status.
    pub status: ContainerStatus,
    /// Date cargo was loaded, once known.
    pub loading_date: Option<DateTime<Utc>>,
    /// Date the vessel departed, once known.
    pub departure_date: Option<DateTime<Utc>>,
    /// Carrier-estimated arrival date.
    pub estimated_arrival: Option<DateTime<Utc>>,
    /// Actual arrival date, once known.
    pub actual_arrival: Option<DateTime<Utc>>,
    /// Derived progress percentage (0–100).
    pub progress: u8,
    /// Last reported location, free text.
    pub current_location: Option<String>,
    /// Timestamp of the last location/progress update.
    pub last_location_update: Option<DateTime<Utc>>,
    /// Record creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
}

impl Container {
    /// Creates a new container record in the `Created` status.
    #[must_use]
    pub fn new(container_number: String, tracking_number: Option<String>) -> Self {
        Self {
            container_id: ContainerId::new(),
            container_number,
            tracking_number,
            status: ContainerStatus::Created,
            loading_date: None,
            departure_date: None,
            estimated_arrival: None,
            actual_arrival: None,
            progress: 0,
            current_location: None,
            last_location_update: None,
            created_at: Utc::now(),
        }
    }

    /// Returns `true` once the container has reached `Closed`.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status == ContainerStatus::Closed
    }
}

/// Lightweight summary of a container for list endpoints and the batch
/// sync entry point.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerSummary {
    /// Container identifier.
    pub container_id: ContainerId,
    /// Business identifier.
    pub container_number: String,
    /// Carrier tracking number, if assigned.
    pub tracking_number: Option<String>,
    /// Current lifecycle status.
    pub status: ContainerStatus,
    /// Derived progress percentage.
    pub progress: u8,
}

impl From<&Container> for ContainerSummary {
    fn from(container: &Container) -> Self {
        Self {
            container_id: container.container_id,
            container_number: container.container_number.clone(),
            tracking_number: container.tracking_number.clone(),
            status: container.status,
            progress: container.progress,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_ranks_are_strictly_increasing() {
        let sequence = [
            ContainerStatus::Created,
            ContainerStatus::WaitingForLoading,
            ContainerStatus::Loaded,
            ContainerStatus::InTransit,
            ContainerStatus::ArrivedPort,
            ContainerStatus::CustomsClearance,
            ContainerStatus::Released,
            ContainerStatus::Closed,
        ];
        for pair in sequence.windows(2) {
            let [a, b] = pair else {
                panic!("window of two");
            };
            assert!(a.rank() < b.rank());
        }
    }

    #[test]
    fn has_reached_is_reflexive_and_ordered() {
        assert!(ContainerStatus::InTransit.has_reached(ContainerStatus::InTransit));
        assert!(ContainerStatus::Released.has_reached(ContainerStatus::Loaded));
        assert!(!ContainerStatus::Loaded.has_reached(ContainerStatus::Released));
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&ContainerStatus::WaitingForLoading).ok();
        assert_eq!(json.as_deref(), Some("\"WAITING_FOR_LOADING\""));
        let parsed: Option<ContainerStatus> = serde_json::from_str("\"IN_TRANSIT\"").ok();
        assert_eq!(parsed, Some(ContainerStatus::InTransit));
    }

    #[test]
    fn new_container_starts_at_created() {
        let c = Container::new("MSKU1234567".to_string(), Some("TRK-1".to_string()));
        assert_eq!(c.status, ContainerStatus::Created);
        assert_eq!(c.progress, 0);
        assert!(c.loading_date.is_none());
        assert!(!c.is_closed());
    }
}
