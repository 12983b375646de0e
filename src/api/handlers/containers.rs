//! Container handlers: registration, status changes, manual events,
//! timeline, and the batch sync entry point.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    ActiveContainerDto, ActiveContainersResponse, ContainerResponse, CreateContainerRequest,
    IngestResponse, ManualEventRequest, TimelineResponse, TimelineStageDto, UpdateStatusRequest,
};
use crate::app_state::AppState;
use crate::domain::ContainerId;
use crate::error::{CoreError, ErrorResponse};
use crate::service::{IngestOutcome, TrackingSignal};

/// `POST /containers` — Register a container record.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] on an empty container number or
/// an already-assigned tracking number.
#[utoipa::path(
    post,
    path = "/api/v1/containers",
    tag = "Containers",
    summary = "Register a container",
    request_body = CreateContainerRequest,
    responses(
        (status = 201, description = "Container registered", body = ContainerResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_container(
    State(state): State<AppState>,
    Json(req): Json<CreateContainerRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let container = state
        .tracking
        .register_container(req.container_number, req.tracking_number, req.estimated_arrival)
        .await?;
    Ok((StatusCode::CREATED, Json(ContainerResponse::from(&container))))
}

/// `GET /containers/{id}` — Container details.
///
/// # Errors
///
/// Returns [`CoreError::ContainerNotFound`] if the container does not
/// exist.
#[utoipa::path(
    get,
    path = "/api/v1/containers/{id}",
    tag = "Containers",
    summary = "Get container details",
    params(("id" = uuid::Uuid, Path, description = "Container UUID")),
    responses(
        (status = 200, description = "Container details", body = ContainerResponse),
        (status = 404, description = "Container not found", body = ErrorResponse),
    )
)]
pub async fn get_container(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let container = state.tracking.container(ContainerId::from_uuid(id)).await?;
    Ok(Json(ContainerResponse::from(&container)))
}

/// `PATCH /containers/{id}/status` — Apply a forward-only status change.
///
/// # Errors
///
/// Returns [`CoreError::ContainerNotFound`] on an unknown container and
/// [`CoreError::StatusRegression`] on a backward transition.
#[utoipa::path(
    patch,
    path = "/api/v1/containers/{id}/status",
    tag = "Containers",
    summary = "Change container status",
    params(("id" = uuid::Uuid, Path, description = "Container UUID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ContainerResponse),
        (status = 404, description = "Container not found", body = ErrorResponse),
        (status = 422, description = "Status regression rejected", body = ErrorResponse),
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let container = state
        .tracking
        .set_status(ContainerId::from_uuid(id), req.status, req.occurred_at)
        .await?;
    Ok(Json(ContainerResponse::from(&container)))
}

/// `POST /containers/{id}/events` — Record a manual tracking event.
///
/// Same dedup and recompute rules as the webhook path, with
/// `source = MANUAL`.
///
/// # Errors
///
/// Returns [`CoreError::ContainerNotFound`] on an unknown container and
/// [`CoreError::InvalidRequest`] on an empty status label.
#[utoipa::path(
    post,
    path = "/api/v1/containers/{id}/events",
    tag = "Containers",
    summary = "Record a manual tracking event",
    params(("id" = uuid::Uuid, Path, description = "Container UUID")),
    request_body = ManualEventRequest,
    responses(
        (status = 200, description = "Event recorded or duplicate no-op", body = IngestResponse),
        (status = 404, description = "Container not found", body = ErrorResponse),
    )
)]
pub async fn create_manual_event(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<ManualEventRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let signal = TrackingSignal {
        status: req.status,
        event_date: req.event_date.unwrap_or_else(Utc::now),
        location: req.location,
        vessel_name: req.vessel_name,
        description: req.description,
        latitude: req.latitude,
        longitude: req.longitude,
    };
    let outcome = state
        .tracking
        .record_manual_event(ContainerId::from_uuid(id), signal)
        .await?;
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

/// `GET /containers/{id}/timeline` — Milestone timeline.
///
/// # Errors
///
/// Returns [`CoreError::ContainerNotFound`] if the container does not
/// exist.
#[utoipa::path(
    get,
    path = "/api/v1/containers/{id}/timeline",
    tag = "Containers",
    summary = "Get the milestone timeline",
    params(("id" = uuid::Uuid, Path, description = "Container UUID")),
    responses(
        (status = 200, description = "Ordered milestone stages", body = TimelineResponse),
        (status = 404, description = "Container not found", body = ErrorResponse),
    )
)]
pub async fn get_timeline(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let stages = state.tracking.timeline(ContainerId::from_uuid(id)).await?;
    Ok(Json(TimelineResponse {
        container_id: id,
        stages: stages.iter().map(TimelineStageDto::from).collect(),
    }))
}

/// `GET /containers/active` — Active containers for the external sync
/// scheduler.
#[utoipa::path(
    get,
    path = "/api/v1/containers/active",
    tag = "Containers",
    summary = "List active (non-closed) containers",
    responses(
        (status = 200, description = "Active container summaries", body = ActiveContainersResponse),
    )
)]
pub async fn list_active(State(state): State<AppState>) -> impl IntoResponse {
    let summaries = state.tracking.list_active().await;
    let data: Vec<ActiveContainerDto> = summaries.iter().map(ActiveContainerDto::from).collect();
    let total = data.len();
    Json(ActiveContainersResponse { data, total })
}

/// Container routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/containers", post(create_container))
        .route("/containers/active", get(list_active))
        .route("/containers/{id}", get(get_container))
        .route("/containers/{id}/status", patch(update_status))
        .route("/containers/{id}/events", post(create_manual_event))
        .route("/containers/{id}/timeline", get(get_timeline))
}
