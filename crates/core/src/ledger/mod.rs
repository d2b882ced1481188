//! Hour bank ledger.
//!
//! This module implements the compensatory-time ledger:
//! - Ledger entries (credits and debits of hours)
//! - Fortnight calendar and locking
//! - Entry date resolution from note markers
//! - Balance, fortnight totals and monthly trend
//! - Registration and mutation guards
//! - Balance ceiling enforcement
//! - Storage contract and an in-memory implementation
//! - Controller orchestrating the above per worker session

pub mod balance;
pub mod controller;
pub mod entry;
pub mod error;
pub mod fortnight;
pub mod guard;
pub mod limit;
pub mod memory;
pub mod note;
pub mod resolver;
pub mod store;

pub use balance::{FortnightTotals, MonthlyHours, TrailingMonths};
pub use controller::{
    CurrentFortnight, EntryView, LedgerController, LedgerSession, LedgerSummary, RegisterRequest,
};
pub use entry::{EntryKind, EntryPatch, LedgerEntry, NewLedgerEntry};
pub use error::{ErrorKind, LedgerError, StoreError};
pub use fortnight::{Fortnight, Half};
pub use memory::InMemoryTransactionLog;
pub use resolver::EntryDateResolver;
pub use store::{OwnerSettings, TransactionLog};
