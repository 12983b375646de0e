//! Ledger handlers: expense postings, entry queries, and shipment
//! registration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateShipmentRequest, EntriesQuery, EntriesResponse, ExpensesResponse, LedgerEntryDto,
    PostExpenseRequest, ShipmentResponse,
};
use crate::app_state::AppState;
use crate::domain::{PaymentStatus, ShipmentId, UserId};
use crate::error::{CoreError, ErrorResponse};

/// `POST /ledger/expenses` — Post a shipment expense.
///
/// Resolves the shipment's owning account internally and returns the
/// created entry including its post-transaction balance.
///
/// # Errors
///
/// Returns [`CoreError::ShipmentNotFound`] on an unknown shipment and
/// [`CoreError::InvalidRequest`] on a non-positive amount.
#[utoipa::path(
    post,
    path = "/api/v1/ledger/expenses",
    tag = "Ledger",
    summary = "Post a shipment expense",
    request_body = PostExpenseRequest,
    responses(
        (status = 201, description = "Entry posted", body = LedgerEntryDto),
        (status = 400, description = "Invalid amount", body = ErrorResponse),
        (status = 404, description = "Shipment not found", body = ErrorResponse),
    )
)]
pub async fn post_expense(
    State(state): State<AppState>,
    Json(req): Json<PostExpenseRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let entry = state
        .ledger
        .post_expense(
            ShipmentId::from_uuid(req.shipment_id),
            req.description,
            req.amount,
            req.expense_type,
            req.notes,
            // Attribution comes from the auth layer in the surrounding
            // system; this core records the transport-level principal.
            "api".to_string(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(LedgerEntryDto::from(&entry))))
}

/// `GET /ledger/entries` — List entries for an account.
#[utoipa::path(
    get,
    path = "/api/v1/ledger/entries",
    tag = "Ledger",
    summary = "List ledger entries",
    params(EntriesQuery),
    responses(
        (status = 200, description = "Entries in posting order", body = EntriesResponse),
    )
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<EntriesQuery>,
) -> impl IntoResponse {
    let user_id = UserId::from_uuid(query.user_id);
    let entries = state
        .ledger
        .entries(
            user_id,
            query.shipment_id.map(ShipmentId::from_uuid),
            query.from,
            query.to,
        )
        .await;
    let balance = state.ledger.balance(user_id).await;
    Json(EntriesResponse {
        data: entries.iter().map(LedgerEntryDto::from).collect(),
        balance,
    })
}

/// `GET /shipments/{id}/expenses` — Expense entries and total for a
/// shipment.
///
/// # Errors
///
/// Returns [`CoreError::ShipmentNotFound`] if the shipment does not
/// exist.
#[utoipa::path(
    get,
    path = "/api/v1/shipments/{id}/expenses",
    tag = "Ledger",
    summary = "Get shipment expenses",
    params(("id" = uuid::Uuid, Path, description = "Shipment UUID")),
    responses(
        (status = 200, description = "Expense entries and total", body = ExpensesResponse),
        (status = 404, description = "Shipment not found", body = ErrorResponse),
    )
)]
pub async fn shipment_expenses(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let (entries, total) = state
        .ledger
        .expenses_for_shipment(ShipmentId::from_uuid(id))
        .await?;
    Ok(Json(ExpensesResponse {
        shipment_id: id,
        data: entries.iter().map(LedgerEntryDto::from).collect(),
        total,
    }))
}

/// `POST /shipments` — Register a shipment directory record.
///
/// # Errors
///
/// Returns [`CoreError::InvalidRequest`] if the shipment is already
/// registered.
#[utoipa::path(
    post,
    path = "/api/v1/shipments",
    tag = "Ledger",
    summary = "Register a shipment",
    request_body = CreateShipmentRequest,
    responses(
        (status = 201, description = "Shipment registered", body = ShipmentResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_shipment(
    State(state): State<AppState>,
    Json(req): Json<CreateShipmentRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let shipment = state
        .ledger
        .register_shipment(
            UserId::from_uuid(req.user_id),
            req.created_at,
            req.payment_status.unwrap_or(PaymentStatus::Unpaid),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ShipmentResponse::from(&shipment))))
}

/// Ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/expenses", post(post_expense))
        .route("/ledger/entries", get(list_entries))
        .route("/shipments", post(create_shipment))
        .route("/shipments/{id}/expenses", get(shipment_expenses))
}
