//! Ledger service: postings, balance queries, and the aging report.
//!
//! Postings hold the account's mutex for the whole read-latest-balance,
//! compute, append sequence, so two concurrent postings for the same
//! account always observe each other's committed balance.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    CoreEvent, EntryType, EventBus, EventId, LedgerEntry, LedgerStore, PaymentStatus, Shipment,
    ShipmentDirectory, ShipmentId, UserId, EXPENSE_CATEGORY,
};
use crate::error::CoreError;
use crate::reports::aging::{self, AgingReport};

/// A posting request, validated by [`LedgerService::post_entry`].
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// Account to post against.
    pub user_id: UserId,
    /// Shipment the cost is attributed to, if any.
    pub shipment_id: Option<ShipmentId>,
    /// Human-readable description.
    pub description: String,
    /// Entry direction.
    pub entry_type: EntryType,
    /// Posted amount; must be strictly positive.
    pub amount: Decimal,
    /// Who created the entry.
    pub created_by: String,
    /// Free-text notes, if any.
    pub notes: Option<String>,
    /// Structured tags, if any.
    pub metadata: Option<serde_json::Value>,
}

/// Orchestration layer for the ledger.
#[derive(Debug, Clone)]
pub struct LedgerService {
    ledger: Arc<LedgerStore>,
    shipments: Arc<ShipmentDirectory>,
    event_bus: EventBus,
}

impl LedgerService {
    /// Creates a new `LedgerService`.
    #[must_use]
    pub fn new(
        ledger: Arc<LedgerStore>,
        shipments: Arc<ShipmentDirectory>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            ledger,
            shipments,
            event_bus,
        }
    }

    /// Returns a reference to the shipment directory.
    #[must_use]
    pub fn shipments(&self) -> &Arc<ShipmentDirectory> {
        &self.shipments
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Posts a ledger entry and returns it with its post-transaction
    /// balance.
    ///
    /// Serialized per account: the posting holds the account mutex from
    /// balance read to append.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRequest`] if the amount is not
    /// strictly positive, or [`CoreError::ShipmentNotFound`] if a
    /// referenced shipment does not exist.
    pub async fn post_entry(&self, new_entry: NewEntry) -> Result<LedgerEntry, CoreError> {
        if new_entry.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidRequest(format!(
                "amount must be positive, got {}",
                new_entry.amount
            )));
        }
        if let Some(shipment_id) = new_entry.shipment_id {
            let _ = self.shipments.get(shipment_id).await?;
        }

        let account = self.ledger.account(new_entry.user_id).await;
        let mut guard = account.lock().await;

        let balance = new_entry
            .entry_type
            .apply(guard.latest_balance(), new_entry.amount);
        let entry = LedgerEntry {
            entry_id: EventId::new(),
            user_id: new_entry.user_id,
            shipment_id: new_entry.shipment_id,
            description: new_entry.description,
            entry_type: new_entry.entry_type,
            amount: new_entry.amount,
            balance,
            created_by: new_entry.created_by,
            transaction_date: Utc::now(),
            notes: new_entry.notes,
            metadata: new_entry.metadata,
        };
        guard.append(entry.clone());
        drop(guard);

        let _ = self.event_bus.publish(CoreEvent::EntryPosted {
            entry: entry.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(
            user_id = %entry.user_id,
            entry_id = %entry.entry_id,
            amount = %entry.amount,
            balance = %entry.balance,
            "ledger entry posted"
        );
        Ok(entry)
    }

    /// Posts a shipment expense as a debit against the shipment's owning
    /// account, tagging the entry metadata as an expense.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShipmentNotFound`] if the shipment does not
    /// exist, or [`CoreError::InvalidRequest`] on a non-positive amount.
    pub async fn post_expense(
        &self,
        shipment_id: ShipmentId,
        description: String,
        amount: Decimal,
        expense_type: String,
        notes: Option<String>,
        created_by: String,
    ) -> Result<LedgerEntry, CoreError> {
        let shipment = self.shipments.get(shipment_id).await?;
        self.post_entry(NewEntry {
            user_id: shipment.user_id,
            shipment_id: Some(shipment_id),
            description,
            entry_type: EntryType::Debit,
            amount,
            created_by,
            notes,
            metadata: Some(serde_json::json!({
                "category": EXPENSE_CATEGORY,
                "expense_type": expense_type,
            })),
        })
        .await
    }

    /// Returns the account's entries in posting order, optionally
    /// filtered by shipment and transaction date range.
    pub async fn entries(
        &self,
        user_id: UserId,
        shipment_id: Option<ShipmentId>,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Vec<LedgerEntry> {
        self.ledger
            .entries_for(user_id)
            .await
            .into_iter()
            .filter(|e| shipment_id.is_none_or(|s| e.shipment_id == Some(s)))
            .filter(|e| from.is_none_or(|f| e.transaction_date >= f))
            .filter(|e| to.is_none_or(|t| e.transaction_date <= t))
            .collect()
    }

    /// Current running balance for an account; zero for a fresh account.
    pub async fn balance(&self, user_id: UserId) -> Decimal {
        let account = self.ledger.account(user_id).await;
        let guard = account.lock().await;
        guard.latest_balance()
    }

    /// Returns expense-tagged entries for a shipment and their total.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShipmentNotFound`] if the shipment does not
    /// exist.
    pub async fn expenses_for_shipment(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<(Vec<LedgerEntry>, Decimal), CoreError> {
        let shipment = self.shipments.get(shipment_id).await?;
        let entries: Vec<LedgerEntry> = self
            .ledger
            .entries_for(shipment.user_id)
            .await
            .into_iter()
            .filter(|e| e.shipment_id == Some(shipment_id) && e.is_expense())
            .collect();
        let total = entries.iter().map(|e| e.amount).sum();
        Ok((entries, total))
    }

    /// Registers a shipment directory record on behalf of the CRUD
    /// layer.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRequest`] if the shipment is already
    /// registered.
    pub async fn register_shipment(
        &self,
        user_id: UserId,
        created_at: Option<DateTime<Utc>>,
        payment_status: PaymentStatus,
    ) -> Result<Shipment, CoreError> {
        let shipment = Shipment {
            shipment_id: ShipmentId::new(),
            user_id,
            created_at: created_at.unwrap_or_else(Utc::now),
            payment_status,
        };
        let snapshot = shipment.clone();
        let _ = self.shipments.insert(shipment).await?;
        tracing::info!(shipment_id = %snapshot.shipment_id, %user_id, "shipment registered");
        Ok(snapshot)
    }

    /// Builds the aging report over outstanding shipments, optionally
    /// filtered by account (privileged callers only, enforced at the
    /// transport layer).
    pub async fn aging_report(
        &self,
        user_filter: Option<UserId>,
        now: DateTime<Utc>,
    ) -> AgingReport {
        let outstanding = self.shipments.list_outstanding(user_filter).await;
        let mut rows = Vec::with_capacity(outstanding.len());
        for shipment in outstanding {
            let total_debit = self
                .ledger
                .debit_total_for_shipment(shipment.shipment_id)
                .await;
            rows.push((
                shipment.shipment_id,
                shipment.user_id,
                shipment.created_at,
                total_debit,
            ));
        }
        aging::build_report(rows, now)
    }
}
