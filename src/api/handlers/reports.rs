//! Report handlers: aging report and delivery alerts.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::app_state::AppState;
use crate::domain::UserId;

/// Query parameters for `GET /reports/aging`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AgingQuery {
    /// Restrict the report to one account (privileged callers only;
    /// enforcement lives in the surrounding auth layer).
    #[serde(default)]
    pub user_id: Option<uuid::Uuid>,
}

/// `GET /reports/aging` — Bucketed aging report over outstanding
/// shipment balances.
#[utoipa::path(
    get,
    path = "/api/v1/reports/aging",
    tag = "Reports",
    summary = "Aging report",
    description = "Buckets outstanding shipments by age (0-30/31-60/61-90/90+ days) with per-bucket count, total, and percentage of grand total.",
    params(AgingQuery),
    responses(
        (status = 200, description = "Bucketed aging summary with per-shipment detail", body = serde_json::Value),
    )
)]
pub async fn aging_report(
    State(state): State<AppState>,
    Query(query): Query<AgingQuery>,
) -> impl IntoResponse {
    let report = state
        .ledger
        .aging_report(query.user_id.map(UserId::from_uuid), Utc::now())
        .await;
    Json(report)
}

/// `GET /alerts` — Delivery alerts for in-flight containers.
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    tag = "Reports",
    summary = "Delivery alerts",
    description = "Classifies LOADED and IN_TRANSIT containers with a known ETA as ON_TIME, WARNING, or OVERDUE.",
    responses(
        (status = 200, description = "Evaluated alerts", body = serde_json::Value),
    )
)]
pub async fn delivery_alerts(State(state): State<AppState>) -> impl IntoResponse {
    let alerts = state.tracking.delivery_alerts(Utc::now()).await;
    Json(alerts)
}

/// Report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/aging", get(aging_report))
        .route("/alerts", get(delivery_alerts))
}
