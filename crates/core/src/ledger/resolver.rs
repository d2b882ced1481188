//! Recovers the calendar date an entry belongs to.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use super::entry::LedgerEntry;
use super::note;

/// Resolves the logical date of ledger entries.
///
/// The note's date marker wins; otherwise the creation timestamp is read as a
/// calendar date in the ledger's time zone. Resolution never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryDateResolver {
    tz: Tz,
}

impl EntryDateResolver {
    /// Creates a resolver for the given time zone.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Time zone used for timestamp fallbacks.
    #[must_use]
    pub const fn timezone(&self) -> Tz {
        self.tz
    }

    /// Logical date of the entry.
    #[must_use]
    pub fn resolve(&self, entry: &LedgerEntry) -> NaiveDate {
        entry
            .note
            .as_deref()
            .and_then(note::marker_date)
            .unwrap_or_else(|| self.local_date(entry.created_at))
    }

    /// Calendar date of a timestamp in the ledger's time zone.
    #[must_use]
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }
}

impl Default for EntryDateResolver {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::EntryKind;
    use chrono::TimeZone;
    use hourbank_shared::types::{LedgerEntryId, WorkerId};
    use rust_decimal_macros::dec;

    fn entry(note: Option<&str>, created_at: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry {
            id: LedgerEntryId::new(),
            owner_id: WorkerId::new(),
            hours: dec!(8),
            kind: EntryKind::Credit,
            note: note.map(str::to_string),
            created_at,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_marker_wins_over_timestamp() {
        let resolver = EntryDateResolver::default();
        let created = Utc.with_ymd_and_hms(2024, 3, 20, 9, 0, 0).unwrap();
        let e = entry(Some("Extra hours - 02/03/2024 night shift (12h)"), created);
        assert_eq!(resolver.resolve(&e), date(2024, 3, 2));
    }

    #[test]
    fn test_falls_back_to_created_at() {
        let resolver = EntryDateResolver::default();
        let created = Utc.with_ymd_and_hms(2024, 3, 20, 9, 0, 0).unwrap();

        assert_eq!(resolver.resolve(&entry(None, created)), date(2024, 3, 20));
        assert_eq!(
            resolver.resolve(&entry(Some("adjustment"), created)),
            date(2024, 3, 20)
        );
        // Impossible dates silently fall back as well.
        assert_eq!(
            resolver.resolve(&entry(Some("Extra hours - 30/02/2024"), created)),
            date(2024, 3, 20)
        );
    }

    #[test]
    fn test_fallback_uses_local_calendar_day() {
        let resolver = EntryDateResolver::new(Tz::America__Sao_Paulo);
        // 01:30 UTC on the 16th is 22:30 on the 15th in Sao Paulo.
        let created = Utc.with_ymd_and_hms(2024, 3, 16, 1, 30, 0).unwrap();
        assert_eq!(resolver.resolve(&entry(None, created)), date(2024, 3, 15));
    }
}
