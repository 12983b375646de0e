//! REST endpoint handlers organized by resource.

pub mod containers;
pub mod ledger;
pub mod reports;
pub mod system;
pub mod tracking;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(tracking::routes())
        .merge(containers::routes())
        .merge(ledger::routes())
        .merge(reports::routes())
}
