//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::{LedgerService, TrackingService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
///
/// The services own the event bus; subscribers (the persistence tasks,
/// external collaborators) obtain receivers from them directly.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Tracking service for container lifecycle and ingestion.
    pub tracking: Arc<TrackingService>,
    /// Ledger service for postings and reports.
    pub ledger: Arc<LedgerService>,
}
