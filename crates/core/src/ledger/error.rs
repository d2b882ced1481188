//! Ledger error types.
//!
//! Every rejection is an explicit variant so callers can branch on the reason
//! (and on [`LedgerError::error_code`]) to render the right explanation.

use chrono::NaiveDate;
use hourbank_shared::types::LedgerEntryId;
use rust_decimal::Decimal;
use thiserror::Error;

use super::fortnight::Fortnight;

/// Failure reported by a [`TransactionLog`](super::store::TransactionLog).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The entry does not exist in the store.
    #[error("ledger entry not found in store: {0}")]
    NotFound(LedgerEntryId),

    /// The store returned data the ledger cannot interpret.
    #[error("corrupt ledger record: {0}")]
    Corrupt(String),

    /// The backing store failed.
    #[error("ledger store error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Wraps a backend failure.
    #[must_use]
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }

    /// Reports an unreadable record.
    #[must_use]
    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

/// Broad category of a [`LedgerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request, rejected before any store call.
    Validation,
    /// Request violates a ledger rule, rejected before any store call.
    Policy,
    /// The referenced entry is not in the session's snapshot.
    NotFound,
    /// The external store failed.
    Store,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Hour quantity cannot be zero.
    #[error("Hours cannot be zero")]
    ZeroHours,

    /// Hour quantity cannot be negative.
    #[error("Hours cannot be negative: {0}")]
    NegativeHours(Decimal),

    /// Hour quantity has more than two decimal places.
    #[error("Hours can have at most two decimal places: {0}")]
    TooPrecise(Decimal),

    /// No date was supplied for the registration.
    #[error("A date is required to register hours")]
    MissingDate,

    /// The label carries its own `" - DD/MM/YYYY"` date.
    #[error("Invalid note label: '{0}'")]
    InvalidLabel(String),

    // ========== Policy Errors ==========
    /// The date lies after today.
    #[error("Cannot register hours for {date}: it is after today ({today})")]
    FutureDate {
        /// Requested date.
        date: NaiveDate,
        /// Today's date in the ledger's time zone.
        today: NaiveDate,
    },

    /// The date belongs to a fortnight that has already closed.
    #[error("The {fortnight} is closed")]
    FortnightClosed {
        /// The locked fortnight.
        fortnight: Fortnight,
    },

    /// Hours are already registered for that date.
    #[error("Hours are already registered for {date}")]
    DuplicateForDate {
        /// The date that already carries an entry.
        date: NaiveDate,
    },

    /// The change would push the balance above the ceiling.
    #[error("Balance limit exceeded: {balance} + {requested} exceeds the ceiling of {ceiling}")]
    LimitExceeded {
        /// Balance before the change.
        balance: Decimal,
        /// Requested increase.
        requested: Decimal,
        /// Configured ceiling.
        ceiling: Decimal,
    },

    // ========== Lookup Errors ==========
    /// Entry is not part of the worker's ledger.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(LedgerEntryId),

    // ========== Store Errors ==========
    /// The store call failed; nothing was applied.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The snapshot is stale and must be refreshed before it can be checked.
    #[error("The ledger is out of date and must be refreshed")]
    StaleSession,

    /// The mutation was applied but reloading the ledger failed.
    #[error("Change saved, but the ledger could not be reloaded: {0}")]
    RefreshFailed(#[source] StoreError),
}

impl LedgerError {
    /// Returns the stable error code for callers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroHours => "ZERO_HOURS",
            Self::NegativeHours(_) => "NEGATIVE_HOURS",
            Self::TooPrecise(_) => "HOURS_TOO_PRECISE",
            Self::MissingDate => "MISSING_DATE",
            Self::InvalidLabel(_) => "INVALID_LABEL",
            Self::FutureDate { .. } => "FUTURE_DATE",
            Self::FortnightClosed { .. } => "FORTNIGHT_CLOSED",
            Self::DuplicateForDate { .. } => "DUPLICATE_FOR_DATE",
            Self::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::Store(_) => "STORE_ERROR",
            Self::StaleSession => "STALE_SESSION",
            Self::RefreshFailed(_) => "REFRESH_FAILED",
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroHours
            | Self::NegativeHours(_)
            | Self::TooPrecise(_)
            | Self::MissingDate
            | Self::InvalidLabel(_) => ErrorKind::Validation,
            Self::FutureDate { .. }
            | Self::FortnightClosed { .. }
            | Self::DuplicateForDate { .. }
            | Self::LimitExceeded { .. } => ErrorKind::Policy,
            Self::EntryNotFound(_) => ErrorKind::NotFound,
            Self::Store(_) | Self::StaleSession | Self::RefreshFailed(_) => ErrorKind::Store,
        }
    }

    /// Returns true if the requested change reached the store.
    #[must_use]
    pub fn mutation_applied(&self) -> bool {
        matches!(self, Self::RefreshFailed(_))
    }
}
