//! Fortnight lock and eligibility rules for creating and changing entries.
//!
//! Posting rules:
//! - future dates: nobody can register
//! - closed fortnight: only privileged callers can register, edit or delete
//! - a date that already carries a marked entry: nobody can register again
//!
//! Privilege is supplied by the caller; identity and roles are resolved
//! elsewhere. It never lifts the duplicate-date rule or the balance ceiling.

use chrono::NaiveDate;
use hourbank_shared::types::WorkerId;

use super::entry::LedgerEntry;
use super::error::LedgerError;
use super::fortnight::{Fortnight, is_closed};
use super::note;
use super::resolver::EntryDateResolver;

/// Checks whether a new entry may be registered for `date`.
///
/// Rejections, in priority order:
/// 1. `FutureDate` when `date` is after `today` (privileged callers included)
/// 2. `FortnightClosed` when the fortnight is locked and the caller is not privileged
/// 3. `DuplicateForDate` when one of the owner's marked entries already names `date`
pub fn can_register(
    date: NaiveDate,
    today: NaiveDate,
    owner: WorkerId,
    existing: &[LedgerEntry],
    privileged: bool,
) -> Result<(), LedgerError> {
    if date > today {
        return Err(LedgerError::FutureDate { date, today });
    }

    if is_closed(date, today, privileged) {
        return Err(LedgerError::FortnightClosed {
            fortnight: Fortnight::containing(date),
        });
    }

    let taken = existing
        .iter()
        .filter(|entry| entry.owner_id == owner)
        .filter_map(|entry| entry.note.as_deref().and_then(note::marker_date))
        .any(|marked| marked == date);
    if taken {
        return Err(LedgerError::DuplicateForDate { date });
    }

    Ok(())
}

/// Checks whether an existing entry may be edited or deleted.
pub fn can_mutate(
    entry: &LedgerEntry,
    resolver: &EntryDateResolver,
    today: NaiveDate,
    privileged: bool,
) -> Result<(), LedgerError> {
    let date = resolver.resolve(entry);
    if is_closed(date, today, privileged) {
        return Err(LedgerError::FortnightClosed {
            fortnight: Fortnight::containing(date),
        });
    }
    Ok(())
}

/// Editability flag for display next to each entry.
#[must_use]
pub fn is_editable(
    entry: &LedgerEntry,
    resolver: &EntryDateResolver,
    today: NaiveDate,
    privileged: bool,
) -> bool {
    can_mutate(entry, resolver, today, privileged).is_ok()
}
