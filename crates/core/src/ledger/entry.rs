//! Hour bank entry domain types.

use chrono::{DateTime, Utc};
use hourbank_shared::types::{LedgerEntryId, WorkerId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Decimal places an hour quantity may carry, matching the store's column.
pub const HOURS_DP: u32 = 2;

/// Direction of an hour bank entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Hours earned (adds to the balance).
    Credit,
    /// Hours consumed as time off (subtracts from the balance).
    Debit,
}

impl EntryKind {
    /// Stable lowercase name, as persisted by the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }

    /// Label used in generated notes when the caller supplies none.
    #[must_use]
    pub const fn default_label(self) -> &'static str {
        match self {
            Self::Credit => "Extra hours",
            Self::Debit => "Time off",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single signed movement of hours in a worker's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Store-assigned identifier.
    pub id: LedgerEntryId,
    /// Worker the entry belongs to.
    pub owner_id: WorkerId,
    /// Quantity of hours (always positive).
    pub hours: Decimal,
    /// Whether the entry earns or consumes hours.
    pub kind: EntryKind,
    /// Free-text note, usually carrying the date marker and hour suffix.
    pub note: Option<String>,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the signed hours (positive for credit, negative for debit).
    #[must_use]
    pub fn signed_hours(&self) -> Decimal {
        match self.kind {
            EntryKind::Credit => self.hours,
            EntryKind::Debit => -self.hours,
        }
    }

    /// Returns the note text, or an empty string.
    #[must_use]
    pub fn note_text(&self) -> &str {
        self.note.as_deref().unwrap_or_default()
    }
}

/// Input for inserting a new entry; the store assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    /// Worker the entry belongs to.
    pub owner_id: WorkerId,
    /// Quantity of hours.
    pub hours: Decimal,
    /// Credit or debit.
    pub kind: EntryKind,
    /// Note to persist.
    pub note: Option<String>,
}

/// Partial update of an existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    /// New hour quantity, if changing.
    pub hours: Option<Decimal>,
    /// New note, if changing.
    pub note: Option<String>,
}

impl EntryPatch {
    /// Applies the patch in place, leaving identity and timestamps untouched.
    pub fn apply_to(&self, entry: &mut LedgerEntry) {
        if let Some(hours) = self.hours {
            entry.hours = hours;
        }
        if let Some(note) = &self.note {
            entry.note = Some(note.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(kind: EntryKind, hours: Decimal) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            owner_id: WorkerId::new(),
            hours,
            kind,
            note: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_signed_hours() {
        assert_eq!(entry(EntryKind::Credit, dec!(8)).signed_hours(), dec!(8));
        assert_eq!(entry(EntryKind::Debit, dec!(2.5)).signed_hours(), dec!(-2.5));
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&EntryKind::Credit).unwrap(), "\"credit\"");
        assert_eq!(
            serde_json::from_str::<EntryKind>("\"debit\"").unwrap(),
            EntryKind::Debit
        );
        assert_eq!(EntryKind::Debit.to_string(), "debit");
    }

    #[test]
    fn test_patch_keeps_identity() {
        let mut original = entry(EntryKind::Credit, dec!(4));
        let before = original.clone();
        EntryPatch {
            hours: Some(dec!(6)),
            note: Some("Extra hours - 01/03/2024 (6h)".to_string()),
        }
        .apply_to(&mut original);

        assert_eq!(original.id, before.id);
        assert_eq!(original.owner_id, before.owner_id);
        assert_eq!(original.created_at, before.created_at);
        assert_eq!(original.kind, before.kind);
        assert_eq!(original.hours, dec!(6));
        assert_eq!(original.note_text(), "Extra hours - 01/03/2024 (6h)");
    }
}
