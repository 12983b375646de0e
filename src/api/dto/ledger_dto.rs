//! Ledger-related DTOs: expense postings, entry queries, and shipment
//! registration.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{LedgerEntry, PaymentStatus, Shipment};

/// Request body for `POST /ledger/expenses`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PostExpenseRequest {
    /// Shipment the expense is attributed to; the owning account is
    /// resolved internally.
    pub shipment_id: uuid::Uuid,
    /// Human-readable description.
    pub description: String,
    /// Expense amount; must be strictly positive.
    pub amount: Decimal,
    /// Free-form expense category tag.
    pub expense_type: String,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// One ledger entry in responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct LedgerEntryDto {
    /// Entry identifier.
    pub entry_id: uuid::Uuid,
    /// Account the entry belongs to.
    pub user_id: uuid::Uuid,
    /// Attributed shipment, if any.
    pub shipment_id: Option<uuid::Uuid>,
    /// Human-readable description.
    pub description: String,
    /// Entry direction (`DEBIT` or `CREDIT`).
    pub entry_type: String,
    /// Posted amount.
    pub amount: Decimal,
    /// Running balance after this entry.
    pub balance: Decimal,
    /// Who created the entry.
    pub created_by: String,
    /// When the transaction was posted.
    pub transaction_date: DateTime<Utc>,
    /// Free-text notes, if any.
    pub notes: Option<String>,
    /// Structured tags, if any.
    #[schema(value_type = Object)]
    pub metadata: Option<serde_json::Value>,
}

impl From<&LedgerEntry> for LedgerEntryDto {
    fn from(e: &LedgerEntry) -> Self {
        Self {
            entry_id: *e.entry_id.as_uuid(),
            user_id: *e.user_id.as_uuid(),
            shipment_id: e.shipment_id.map(|s| *s.as_uuid()),
            description: e.description.clone(),
            entry_type: match e.entry_type {
                crate::domain::EntryType::Debit => "DEBIT".to_string(),
                crate::domain::EntryType::Credit => "CREDIT".to_string(),
            },
            amount: e.amount,
            balance: e.balance,
            created_by: e.created_by.clone(),
            transaction_date: e.transaction_date,
            notes: e.notes.clone(),
            metadata: e.metadata.clone(),
        }
    }
}

/// Query parameters for `GET /ledger/entries`.
#[derive(Debug, Deserialize, IntoParams)]
pub struct EntriesQuery {
    /// Account to list entries for.
    pub user_id: uuid::Uuid,
    /// Restrict to entries attributed to this shipment.
    #[serde(default)]
    pub shipment_id: Option<uuid::Uuid>,
    /// Restrict to entries posted at or after this instant.
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Restrict to entries posted at or before this instant.
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

/// Response body for `GET /ledger/entries`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntriesResponse {
    /// Entries in posting order.
    pub data: Vec<LedgerEntryDto>,
    /// Current running balance for the account.
    pub balance: Decimal,
}

/// Response body for `GET /shipments/{id}/expenses`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExpensesResponse {
    /// Shipment identifier.
    pub shipment_id: uuid::Uuid,
    /// Expense-tagged entries.
    pub data: Vec<LedgerEntryDto>,
    /// Sum of expense amounts.
    pub total: Decimal,
}

/// Request body for `POST /shipments`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShipmentRequest {
    /// Account that owns the shipment.
    pub user_id: uuid::Uuid,
    /// Opening date; defaults to now. Aging is measured from here.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Initial payment state; defaults to `UNPAID`.
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "UNPAID")]
    pub payment_status: Option<PaymentStatus>,
}

/// Response body for shipment registration.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentResponse {
    /// Shipment identifier.
    pub shipment_id: uuid::Uuid,
    /// Owning account.
    pub user_id: uuid::Uuid,
    /// Opening date.
    pub created_at: DateTime<Utc>,
    /// Payment state.
    pub payment_status: String,
}

impl From<&Shipment> for ShipmentResponse {
    fn from(s: &Shipment) -> Self {
        Self {
            shipment_id: *s.shipment_id.as_uuid(),
            user_id: *s.user_id.as_uuid(),
            created_at: s.created_at,
            payment_status: match s.payment_status {
                PaymentStatus::Unpaid => "UNPAID".to_string(),
                PaymentStatus::PartiallyPaid => "PARTIALLY_PAID".to_string(),
                PaymentStatus::Paid => "PAID".to_string(),
            },
        }
    }
}
