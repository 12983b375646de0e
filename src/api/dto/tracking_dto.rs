//! Tracking-related DTOs: webhook payloads, container registration,
//! status changes, manual events, and timeline responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Container, ContainerStatus, ContainerSummary, TimelineStage};

/// Inbound carrier webhook body for `POST /tracking/webhook`.
///
/// Fields are optional at the serde level so a missing `trackingNumber`
/// or `event` maps to a 400 with a clear message instead of a generic
/// deserialization failure.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    /// Carrier tracking number identifying the container.
    pub tracking_number: Option<String>,
    /// The tracking event payload.
    pub event: Option<WebhookEventDto>,
}

/// Event payload inside a webhook delivery.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEventDto {
    /// Free-text status label.
    pub status: Option<String>,
    /// Reported location.
    #[serde(default)]
    pub location: Option<String>,
    /// Vessel name.
    #[serde(default)]
    pub vessel_name: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// When the event occurred (ISO-8601).
    pub timestamp: Option<DateTime<Utc>>,
    /// Reported latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Reported longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Response body for webhook and manual-event ingestion.
#[derive(Debug, Serialize, ToSchema)]
pub struct IngestResponse {
    /// `true` when an equivalent event was already recorded and the
    /// call was an idempotent no-op.
    pub duplicate: bool,
    /// Identifier of the stored event (existing one on duplicates).
    pub event_id: uuid::Uuid,
    /// Container progress after the signal; absent on duplicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// Whether the signal was terminal; absent on duplicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal: Option<bool>,
}

/// Request body for `POST /containers`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateContainerRequest {
    /// Business identifier printed on the container.
    pub container_number: String,
    /// Carrier tracking number, if already known.
    #[serde(default)]
    pub tracking_number: Option<String>,
    /// Carrier-estimated arrival, if already known.
    #[serde(default)]
    pub estimated_arrival: Option<DateTime<Utc>>,
}

/// Request body for `PATCH /containers/{id}/status`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Target lifecycle status (forward-only).
    #[schema(value_type = String, example = "IN_TRANSIT")]
    pub status: ContainerStatus,
    /// When the transition occurred; defaults to now. Stamps the
    /// corresponding date field when reaching LOADED / IN_TRANSIT /
    /// ARRIVED_PORT.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /containers/{id}/events` (manual entry).
#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualEventRequest {
    /// Free-text status label.
    pub status: String,
    /// When the event occurred; defaults to now.
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
    /// Reported location.
    #[serde(default)]
    pub location: Option<String>,
    /// Vessel name.
    #[serde(default)]
    pub vessel_name: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Reported latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Reported longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Full container detail for create and get responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContainerResponse {
    /// Container identifier.
    pub container_id: uuid::Uuid,
    /// Business identifier.
    pub container_number: String,
    /// Carrier tracking number, if assigned.
    pub tracking_number: Option<String>,
    /// Current lifecycle status.
    pub status: String,
    /// Loading date, once known.
    pub loading_date: Option<DateTime<Utc>>,
    /// Departure date, once known.
    pub departure_date: Option<DateTime<Utc>>,
    /// Estimated arrival, if known.
    pub estimated_arrival: Option<DateTime<Utc>>,
    /// Actual arrival, once known.
    pub actual_arrival: Option<DateTime<Utc>>,
    /// Derived progress percentage.
    pub progress: u8,
    /// Last reported location.
    pub current_location: Option<String>,
    /// Timestamp of the last location/progress update.
    pub last_location_update: Option<DateTime<Utc>>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&Container> for ContainerResponse {
    fn from(c: &Container) -> Self {
        Self {
            container_id: *c.container_id.as_uuid(),
            container_number: c.container_number.clone(),
            tracking_number: c.tracking_number.clone(),
            status: c.status.to_string(),
            loading_date: c.loading_date,
            departure_date: c.departure_date,
            estimated_arrival: c.estimated_arrival,
            actual_arrival: c.actual_arrival,
            progress: c.progress,
            current_location: c.current_location.clone(),
            last_location_update: c.last_location_update,
            created_at: c.created_at,
        }
    }
}

/// One milestone stage in a timeline response.
#[derive(Debug, Serialize, ToSchema)]
pub struct TimelineStageDto {
    /// Milestone identifier.
    pub stage: String,
    /// Best-known date, if any.
    pub date: Option<DateTime<Utc>>,
    /// Whether the milestone has been passed.
    pub completed: bool,
    /// `true` only for the estimated ETA stage.
    pub estimated: bool,
}

impl From<&TimelineStage> for TimelineStageDto {
    fn from(s: &TimelineStage) -> Self {
        Self {
            stage: s.stage.as_str().to_string(),
            date: s.date,
            completed: s.completed,
            estimated: s.estimated,
        }
    }
}

/// Response body for `GET /containers/{id}/timeline`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TimelineResponse {
    /// Container identifier.
    pub container_id: uuid::Uuid,
    /// Milestone stages in fixed order.
    pub stages: Vec<TimelineStageDto>,
}

/// One active container for the batch sync entry point.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveContainerDto {
    /// Container identifier.
    pub container_id: uuid::Uuid,
    /// Business identifier.
    pub container_number: String,
    /// Carrier tracking number, if assigned.
    pub tracking_number: Option<String>,
    /// Current lifecycle status.
    pub status: String,
    /// Derived progress percentage.
    pub progress: u8,
}

impl From<&ContainerSummary> for ActiveContainerDto {
    fn from(s: &ContainerSummary) -> Self {
        Self {
            container_id: *s.container_id.as_uuid(),
            container_number: s.container_number.clone(),
            tracking_number: s.tracking_number.clone(),
            status: s.status.to_string(),
            progress: s.progress,
        }
    }
}

/// Response body for `GET /containers/active`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveContainersResponse {
    /// Active container summaries.
    pub data: Vec<ActiveContainerDto>,
    /// Total count.
    pub total: usize,
}
