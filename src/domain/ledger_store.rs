//! Append-only per-account ledger storage.
//!
//! [`LedgerStore`] keeps one [`AccountLedger`] per user, each behind its
//! own [`tokio::sync::Mutex`]. The posting sequence (read latest balance,
//! compute, append) runs while holding the account's mutex, which is the
//! serialization guarantee that prevents the classic read-modify-append
//! race between concurrent postings.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::{Mutex, RwLock};

use super::ledger::LedgerEntry;
use super::{EntryType, ShipmentId, UserId};

/// Append-only entry sequence for a single account.
#[derive(Debug, Default)]
pub struct AccountLedger {
    entries: Vec<LedgerEntry>,
}

impl AccountLedger {
    /// Running balance after the most recent entry, or zero for a fresh
    /// account. Entries are appended in posting order, so the last
    /// element is the latest by transaction date with insertion order as
    /// the tie-break.
    #[must_use]
    pub fn latest_balance(&self) -> Decimal {
        self.entries.last().map_or(Decimal::ZERO, |e| e.balance)
    }

    /// Appends an entry. The caller must hold the account mutex.
    pub fn append(&mut self, entry: LedgerEntry) {
        self.entries.push(entry);
    }

    /// All entries in posting order.
    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }
}

/// Concurrent store of per-account ledgers.
///
/// # Concurrency
///
/// - Postings to different accounts proceed concurrently.
/// - Postings to the same account are serialized by the account mutex.
/// - Reads clone entry snapshots and never block postings for long.
#[derive(Debug, Default)]
pub struct LedgerStore {
    accounts: RwLock<HashMap<UserId, Arc<Mutex<AccountLedger>>>>,
}

impl LedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the account ledger for `user_id`, creating it on first
    /// use. Postings lock the returned mutex for the whole
    /// read-compute-append sequence.
    pub async fn account(&self, user_id: UserId) -> Arc<Mutex<AccountLedger>> {
        {
            let map = self.accounts.read().await;
            if let Some(ledger) = map.get(&user_id) {
                return Arc::clone(ledger);
            }
        }
        let mut map = self.accounts.write().await;
        Arc::clone(
            map.entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(AccountLedger::default()))),
        )
    }

    /// Returns a cloned snapshot of all entries for `user_id`, in
    /// posting order. Empty if the account has no entries.
    pub async fn entries_for(&self, user_id: UserId) -> Vec<LedgerEntry> {
        let ledger = {
            let map = self.accounts.read().await;
            map.get(&user_id).cloned()
        };
        match ledger {
            Some(ledger) => ledger.lock().await.entries.clone(),
            None => Vec::new(),
        }
    }

    /// Sums all debit entries attributed to the given shipment across
    /// every account. Used by the aging reporter.
    pub async fn debit_total_for_shipment(&self, shipment_id: ShipmentId) -> Decimal {
        let ledgers: Vec<Arc<Mutex<AccountLedger>>> = {
            let map = self.accounts.read().await;
            map.values().cloned().collect()
        };
        let mut total = Decimal::ZERO;
        for ledger in ledgers {
            let guard = ledger.lock().await;
            for entry in &guard.entries {
                if entry.shipment_id == Some(shipment_id) && entry.entry_type == EntryType::Debit {
                    total += entry.amount;
                }
            }
        }
        total
    }

    /// Returns the number of accounts with a ledger.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Returns `true` if no account has a ledger yet.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::EventId;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn make_entry(
        user_id: UserId,
        shipment_id: Option<ShipmentId>,
        entry_type: EntryType,
        amount: Decimal,
        balance: Decimal,
    ) -> LedgerEntry {
        LedgerEntry {
            entry_id: EventId::new(),
            user_id,
            shipment_id,
            description: "test".to_string(),
            entry_type,
            amount,
            balance,
            created_by: "tests".to_string(),
            transaction_date: Utc::now(),
            notes: None,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn fresh_account_has_zero_balance() {
        let store = LedgerStore::new();
        let account = store.account(UserId::new()).await;
        assert_eq!(account.lock().await.latest_balance(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn append_advances_latest_balance() {
        let store = LedgerStore::new();
        let user = UserId::new();
        let account = store.account(user).await;
        {
            let mut guard = account.lock().await;
            guard.append(make_entry(user, None, EntryType::Debit, dec!(500), dec!(500)));
            guard.append(make_entry(user, None, EntryType::Credit, dec!(200), dec!(300)));
        }
        assert_eq!(account.lock().await.latest_balance(), dec!(300));
    }

    #[tokio::test]
    async fn account_is_shared_between_calls() {
        let store = LedgerStore::new();
        let user = UserId::new();
        let first = store.account(user).await;
        first
            .lock()
            .await
            .append(make_entry(user, None, EntryType::Debit, dec!(10), dec!(10)));

        let second = store.account(user).await;
        assert_eq!(second.lock().await.entries().len(), 1);
    }

    #[tokio::test]
    async fn entries_for_unknown_account_is_empty() {
        let store = LedgerStore::new();
        assert!(store.entries_for(UserId::new()).await.is_empty());
    }

    #[tokio::test]
    async fn debit_total_filters_by_shipment_and_type() {
        let store = LedgerStore::new();
        let user = UserId::new();
        let shipment = ShipmentId::new();
        let other_shipment = ShipmentId::new();

        let account = store.account(user).await;
        {
            let mut guard = account.lock().await;
            guard.append(make_entry(
                user,
                Some(shipment),
                EntryType::Debit,
                dec!(100),
                dec!(100),
            ));
            guard.append(make_entry(
                user,
                Some(shipment),
                EntryType::Debit,
                dec!(50),
                dec!(150),
            ));
            // Credits and other shipments don't count toward the total.
            guard.append(make_entry(
                user,
                Some(shipment),
                EntryType::Credit,
                dec!(30),
                dec!(120),
            ));
            guard.append(make_entry(
                user,
                Some(other_shipment),
                EntryType::Debit,
                dec!(999),
                dec!(1119),
            ));
        }

        assert_eq!(store.debit_total_for_shipment(shipment).await, dec!(150));
    }
}
