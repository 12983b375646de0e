//! Shipment directory.
//!
//! Shipments themselves are owned by the external CRUD layer; this core
//! keeps a minimal directory of them so the ledger engine can validate
//! cost attribution and resolve the owning account, and so the aging
//! reporter can find the unpaid set.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::{ShipmentId, UserId};
use crate::error::CoreError;

/// Payment state of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// No payment received.
    Unpaid,
    /// Some payment received, balance outstanding.
    PartiallyPaid,
    /// Fully paid.
    Paid,
}

impl PaymentStatus {
    /// Returns `true` if a balance is still outstanding.
    #[must_use]
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Unpaid | Self::PartiallyPaid)
    }
}

/// Minimal shipment record registered by the CRUD layer.
#[derive(Debug, Clone, Serialize)]
pub struct Shipment {
    /// Unique shipment identifier.
    pub shipment_id: ShipmentId,
    /// Account that owns (and is billed for) the shipment.
    pub user_id: UserId,
    /// When the shipment was opened; aging is measured from here.
    pub created_at: DateTime<Utc>,
    /// Current payment state.
    pub payment_status: PaymentStatus,
}

/// Concurrent directory of shipment records.
#[derive(Debug, Default)]
pub struct ShipmentDirectory {
    shipments: RwLock<HashMap<ShipmentId, Arc<Shipment>>>,
}

impl ShipmentDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a shipment record.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidRequest`] if the shipment ID is
    /// already registered.
    pub async fn insert(&self, shipment: Shipment) -> Result<ShipmentId, CoreError> {
        let shipment_id = shipment.shipment_id;
        let mut map = self.shipments.write().await;
        if map.contains_key(&shipment_id) {
            return Err(CoreError::InvalidRequest(format!(
                "shipment {shipment_id} already registered"
            )));
        }
        map.insert(shipment_id, Arc::new(shipment));
        Ok(shipment_id)
    }

    /// Looks up a shipment by ID.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShipmentNotFound`] if absent.
    pub async fn get(&self, shipment_id: ShipmentId) -> Result<Arc<Shipment>, CoreError> {
        let map = self.shipments.read().await;
        map.get(&shipment_id)
            .cloned()
            .ok_or(CoreError::ShipmentNotFound(*shipment_id.as_uuid()))
    }

    /// Updates a shipment's payment status.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ShipmentNotFound`] if absent.
    pub async fn set_payment_status(
        &self,
        shipment_id: ShipmentId,
        payment_status: PaymentStatus,
    ) -> Result<(), CoreError> {
        let mut map = self.shipments.write().await;
        let entry = map
            .get_mut(&shipment_id)
            .ok_or(CoreError::ShipmentNotFound(*shipment_id.as_uuid()))?;
        let mut updated = (**entry).clone();
        updated.payment_status = payment_status;
        *entry = Arc::new(updated);
        Ok(())
    }

    /// Returns all shipments with an outstanding balance, optionally
    /// filtered by owning account.
    pub async fn list_outstanding(&self, user_filter: Option<UserId>) -> Vec<Arc<Shipment>> {
        let map = self.shipments.read().await;
        map.values()
            .filter(|s| s.payment_status.is_outstanding())
            .filter(|s| user_filter.is_none_or(|u| s.user_id == u))
            .cloned()
            .collect()
    }

    /// Returns the number of registered shipments.
    pub async fn len(&self) -> usize {
        self.shipments.read().await.len()
    }

    /// Returns `true` if no shipments are registered.
    pub async fn is_empty(&self) -> bool {
        self.shipments.read().await.is_empty()
    }
}
