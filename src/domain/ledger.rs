//! Ledger entry types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EventId, ShipmentId, UserId};

/// Metadata value marking an entry as an expense posting.
pub const EXPENSE_CATEGORY: &str = "expense";

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    /// Increases the account balance (amount owed grows).
    Debit,
    /// Decreases the account balance (payment received).
    Credit,
}

impl EntryType {
    /// Applies this entry direction to a balance.
    #[must_use]
    pub fn apply(self, balance: Decimal, amount: Decimal) -> Decimal {
        match self {
            Self::Debit => balance + amount,
            Self::Credit => balance - amount,
        }
    }
}

/// An immutable, signed monetary posting against an account's running
/// balance.
///
/// Append-only: for a fixed account, entries in posting order satisfy
/// `balance[n] = balance[n-1] ± amount[n]` against a starting balance
/// of zero.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntry {
    /// Unique entry identifier.
    pub entry_id: EventId,
    /// Account the entry belongs to.
    pub user_id: UserId,
    /// Shipment the cost is attributed to, if any.
    pub shipment_id: Option<ShipmentId>,
    /// Human-readable description.
    pub description: String,
    /// Entry direction.
    pub entry_type: EntryType,
    /// Posted amount (always positive).
    pub amount: Decimal,
    /// Running balance snapshot *after* this entry is applied.
    pub balance: Decimal,
    /// Who created the entry.
    pub created_by: String,
    /// When the transaction was posted.
    pub transaction_date: DateTime<Utc>,
    /// Free-text notes, if any.
    pub notes: Option<String>,
    /// Structured tags, e.g. `{"category": "expense", "expense_type": …}`.
    pub metadata: Option<serde_json::Value>,
}

impl LedgerEntry {
    /// Returns `true` if the entry's metadata tags it as an expense.
    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("category"))
            .and_then(|v| v.as_str())
            .is_some_and(|c| c == EXPENSE_CATEGORY)
    }
}
