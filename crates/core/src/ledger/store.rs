//! Transaction log accessor contract.

use hourbank_shared::types::{LedgerEntryId, WorkerId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::entry::{EntryPatch, LedgerEntry, NewLedgerEntry};
use super::error::StoreError;

/// Per-worker settings read once per ledger session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerSettings {
    /// Informational hourly rate used for monetary estimates.
    pub hourly_rate: Decimal,
    /// Balance ceiling; `None` falls back to the configured default.
    pub balance_ceiling: Option<Decimal>,
}

impl Default for OwnerSettings {
    fn default() -> Self {
        Self {
            hourly_rate: Decimal::ZERO,
            balance_ceiling: None,
        }
    }
}

/// Storage backend for hour bank entries.
///
/// Implemented by the database repository and by
/// [`InMemoryTransactionLog`](super::memory::InMemoryTransactionLog).
pub trait TransactionLog: Send + Sync {
    /// All entries of `owner`, most recent `created_at` first.
    fn list_entries(
        &self,
        owner: WorkerId,
    ) -> impl std::future::Future<Output = Result<Vec<LedgerEntry>, StoreError>> + Send;

    /// Persists a new entry, assigning its id and creation timestamp.
    fn insert_entry(
        &self,
        input: NewLedgerEntry,
    ) -> impl std::future::Future<Output = Result<LedgerEntry, StoreError>> + Send;

    /// Applies a partial update to an entry.
    fn update_entry(
        &self,
        id: LedgerEntryId,
        patch: EntryPatch,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Removes an entry.
    fn delete_entry(
        &self,
        id: LedgerEntryId,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Settings of `owner`, if any were stored.
    fn owner_settings(
        &self,
        owner: WorkerId,
    ) -> impl std::future::Future<Output = Result<Option<OwnerSettings>, StoreError>> + Send;
}
