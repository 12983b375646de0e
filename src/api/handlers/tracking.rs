//! Webhook ingestion handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{IngestResponse, WebhookRequest};
use crate::app_state::AppState;
use crate::error::{CoreError, ErrorResponse};
use crate::service::{IngestOutcome, TrackingSignal};

/// `POST /tracking/webhook` — Ingest a carrier tracking event.
///
/// Duplicate deliveries (same status label within the dedup window) are
/// reported as a 200 no-op so the upstream sender's retries always see
/// success.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] on a malformed body and
/// [`CoreError::TrackingNumberNotFound`] on an unknown tracking number.
#[utoipa::path(
    post,
    path = "/api/v1/tracking/webhook",
    tag = "Tracking",
    summary = "Ingest a carrier tracking webhook",
    description = "Resolves the container by tracking number, deduplicates the event within a ±60 s window, appends it, and recomputes progress. Duplicates are a successful no-op.",
    request_body = WebhookRequest,
    responses(
        (status = 200, description = "Event recorded or duplicate no-op", body = IngestResponse),
        (status = 400, description = "Missing trackingNumber or event", body = ErrorResponse),
        (status = 404, description = "Unknown tracking number", body = ErrorResponse),
    )
)]
pub async fn ingest_webhook(
    State(state): State<AppState>,
    Json(req): Json<WebhookRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let tracking_number = req
        .tracking_number
        .ok_or_else(|| CoreError::InvalidRequest("missing trackingNumber".to_string()))?;
    let event = req
        .event
        .ok_or_else(|| CoreError::InvalidRequest("missing event".to_string()))?;
    let status = event
        .status
        .ok_or_else(|| CoreError::InvalidRequest("missing event.status".to_string()))?;
    let timestamp = event
        .timestamp
        .ok_or_else(|| CoreError::InvalidRequest("missing event.timestamp".to_string()))?;

    let signal = TrackingSignal {
        status,
        event_date: timestamp,
        location: event.location,
        vessel_name: event.vessel_name,
        description: event.description,
        latitude: event.latitude,
        longitude: event.longitude,
    };

    let outcome = state.tracking.ingest_webhook(&tracking_number, signal).await?;
    let response = match outcome {
        IngestOutcome::Recorded {
            event,
            progress,
            terminal,
        } => IngestResponse {
            duplicate: false,
            event_id: *event.event_id.as_uuid(),
            progress: Some(progress),
            terminal: Some(terminal),
        },
        IngestOutcome::Duplicate { event_id } => IngestResponse {
            duplicate: true,
            event_id: *event_id.as_uuid(),
            progress: None,
            terminal: None,
        },
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Tracking webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/tracking/webhook", post(ingest_webhook))
}
