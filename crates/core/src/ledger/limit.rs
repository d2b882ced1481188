//! Balance ceiling enforcement.
//!
//! Checked against the session's snapshot only. Two sessions writing at the
//! same time can both pass before either write lands.

use rust_decimal::Decimal;

use super::entry::EntryKind;
use super::error::LedgerError;

/// Returns true if adding `hours` keeps the balance within the ceiling.
#[must_use]
pub fn can_add(hours: Decimal, current_balance: Decimal, ceiling: Decimal) -> bool {
    current_balance + hours <= ceiling
}

/// Returns true if changing an entry from `old_hours` to `new_hours` is allowed.
///
/// Only credit entries are constrained, and only when the edit raises the
/// balance. Lowering a credit or editing a debit is never blocked.
#[must_use]
pub fn can_edit(
    old_hours: Decimal,
    new_hours: Decimal,
    current_balance: Decimal,
    kind: EntryKind,
    ceiling: Decimal,
) -> bool {
    let delta = new_hours - old_hours;
    match kind {
        EntryKind::Debit => true,
        EntryKind::Credit => delta <= Decimal::ZERO || can_add(delta, current_balance, ceiling),
    }
}

/// Like [`can_add`], reporting the figures on rejection.
pub fn ensure_can_add(
    hours: Decimal,
    current_balance: Decimal,
    ceiling: Decimal,
) -> Result<(), LedgerError> {
    if can_add(hours, current_balance, ceiling) {
        Ok(())
    } else {
        Err(LedgerError::LimitExceeded {
            balance: current_balance,
            requested: hours,
            ceiling,
        })
    }
}

/// Like [`can_edit`], reporting the figures on rejection.
pub fn ensure_can_edit(
    old_hours: Decimal,
    new_hours: Decimal,
    current_balance: Decimal,
    kind: EntryKind,
    ceiling: Decimal,
) -> Result<(), LedgerError> {
    if can_edit(old_hours, new_hours, current_balance, kind, ceiling) {
        Ok(())
    } else {
        Err(LedgerError::LimitExceeded {
            balance: current_balance,
            requested: new_hours - old_hours,
            ceiling,
        })
    }
}
