//! Service layer: tracking and ledger orchestration.

pub mod ledger_service;
pub mod tracking_service;

pub use ledger_service::{LedgerService, NewEntry};
pub use tracking_service::{IngestOutcome, TrackingService, TrackingSignal};
