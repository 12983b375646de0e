//! Domain layer: entities, identifier newtypes, rule tables, stores,
//! and the event bus.

pub mod container;
pub mod container_store;
pub mod core_event;
pub mod event_bus;
pub mod ids;
pub mod ledger;
pub mod ledger_store;
pub mod progress;
pub mod shipment;
pub mod timeline;
pub mod tracking_event;

pub use container::{Container, ContainerStatus, ContainerSummary};
pub use container_store::{ContainerEntry, ContainerStore};
pub use core_event::CoreEvent;
pub use event_bus::EventBus;
pub use ids::{ContainerId, EventId, ShipmentId, UserId};
pub use ledger::{EntryType, LedgerEntry, EXPENSE_CATEGORY};
pub use ledger_store::{AccountLedger, LedgerStore};
pub use shipment::{PaymentStatus, Shipment, ShipmentDirectory};
pub use timeline::{build_timeline, StageKind, TimelineStage};
pub use tracking_event::{EventSource, TrackingEvent};
