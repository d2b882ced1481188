//! In-process transaction log.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use hourbank_shared::types::{LedgerEntryId, WorkerId};

use super::entry::{EntryPatch, LedgerEntry, NewLedgerEntry};
use super::error::StoreError;
use super::store::{OwnerSettings, TransactionLog};
use crate::clock::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct Stored {
    seq: u64,
    entry: LedgerEntry,
}

/// [`TransactionLog`] kept in concurrent maps.
///
/// Entries sharing a `created_at` are listed in reverse insertion order.
pub struct InMemoryTransactionLog {
    entries: DashMap<LedgerEntryId, Stored>,
    settings: DashMap<WorkerId, OwnerSettings>,
    next_seq: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl InMemoryTransactionLog {
    /// Creates an empty log stamping entries with the system time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty log stamping entries with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            settings: DashMap::new(),
            next_seq: AtomicU64::new(0),
            clock,
        }
    }

    /// Imports an existing entry as is, keeping its id and timestamp.
    pub fn seed(&self, entry: LedgerEntry) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(entry.id, Stored { seq, entry });
    }

    /// Stores the settings of `owner`.
    pub fn set_settings(&self, owner: WorkerId, settings: OwnerSettings) {
        self.settings.insert(owner, settings);
    }

    /// Number of stored entries across all owners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InMemoryTransactionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionLog for InMemoryTransactionLog {
    async fn list_entries(&self, owner: WorkerId) -> Result<Vec<LedgerEntry>, StoreError> {
        let mut stored: Vec<Stored> = self
            .entries
            .iter()
            .filter(|item| item.entry.owner_id == owner)
            .map(|item| item.value().clone())
            .collect();

        stored.sort_by(|a, b| {
            b.entry
                .created_at
                .cmp(&a.entry.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(stored.into_iter().map(|s| s.entry).collect())
    }

    async fn insert_entry(&self, input: NewLedgerEntry) -> Result<LedgerEntry, StoreError> {
        let entry = LedgerEntry {
            id: LedgerEntryId::new(),
            owner_id: input.owner_id,
            hours: input.hours,
            kind: input.kind,
            note: input.note,
            created_at: self.clock.now(),
        };
        self.seed(entry.clone());
        Ok(entry)
    }

    async fn update_entry(&self, id: LedgerEntryId, patch: EntryPatch) -> Result<(), StoreError> {
        let mut stored = self.entries.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply_to(&mut stored.entry);
        Ok(())
    }

    async fn delete_entry(&self, id: LedgerEntryId) -> Result<(), StoreError> {
        self.entries
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn owner_settings(&self, owner: WorkerId) -> Result<Option<OwnerSettings>, StoreError> {
        Ok(self.settings.get(&owner).map(|s| s.value().clone()))
    }
}
