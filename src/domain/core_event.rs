//! Domain events published on the broadcast bus.
//!
//! Every state mutation publishes a [`CoreEvent`]. External collaborators
//! (the invoice generator in particular) subscribe to observe terminal
//! transitions; the optional persistence layer appends events to the
//! durable event log.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ContainerId, ContainerStatus, EventId, LedgerEntry};

/// Domain event emitted on state mutations.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum CoreEvent {
    /// A tracking event was appended to a container's log.
    EventRecorded {
        /// Container the event belongs to.
        container_id: ContainerId,
        /// Stored event identifier.
        event_id: EventId,
        /// Free-text status label.
        status: String,
        /// When the event occurred.
        event_date: DateTime<Utc>,
        /// When the event was recorded.
        timestamp: DateTime<Utc>,
    },

    /// A container's derived progress changed.
    ProgressUpdated {
        /// Affected container.
        container_id: ContainerId,
        /// Progress before the signal.
        old_progress: u8,
        /// Progress after the signal.
        new_progress: u8,
        /// When the update happened.
        timestamp: DateTime<Utc>,
    },

    /// A container's lifecycle status changed.
    StatusChanged {
        /// Affected container.
        container_id: ContainerId,
        /// Previous status.
        from: ContainerStatus,
        /// New status.
        to: ContainerStatus,
        /// When the change happened.
        timestamp: DateTime<Utc>,
    },

    /// A container received a terminal tracking signal. Gates downstream
    /// invoicing.
    ContainerTerminal {
        /// Affected container.
        container_id: ContainerId,
        /// The status label that triggered terminality.
        status: String,
        /// When the signal was processed.
        timestamp: DateTime<Utc>,
    },

    /// A ledger entry was posted. Carries the full entry so the durable
    /// ledger writer can persist the row exactly as it was appended.
    EntryPosted {
        /// The posted entry, including its running balance.
        entry: LedgerEntry,
        /// When the entry was posted.
        timestamp: DateTime<Utc>,
    },
}

impl CoreEvent {
    /// Stable string tag for the event type, used by the event log and
    /// by tests.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::EventRecorded { .. } => "event_recorded",
            Self::ProgressUpdated { .. } => "progress_updated",
            Self::StatusChanged { .. } => "status_changed",
            Self::ContainerTerminal { .. } => "container_terminal",
            Self::EntryPosted { .. } => "entry_posted",
        }
    }

    /// Container this event concerns, if it is a container event.
    #[must_use]
    pub const fn container_id(&self) -> Option<ContainerId> {
        match self {
            Self::EventRecorded { container_id, .. }
            | Self::ProgressUpdated { container_id, .. }
            | Self::StatusChanged { container_id, .. }
            | Self::ContainerTerminal { container_id, .. } => Some(*container_id),
            Self::EntryPosted { .. } => None,
        }
    }

    /// Timestamp at which the event was published.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::EventRecorded { timestamp, .. }
            | Self::ProgressUpdated { timestamp, .. }
            | Self::StatusChanged { timestamp, .. }
            | Self::ContainerTerminal { timestamp, .. }
            | Self::EntryPosted { timestamp, .. } => *timestamp,
        }
    }
}
