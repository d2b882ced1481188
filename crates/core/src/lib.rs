//! Hour bank ledger logic.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Entries, fortnight locking, balance aggregation, eligibility and ceiling
//! rules, and the controller that orchestrates them all live here.
//!
//! # Modules
//!
//! - `ledger` - Compensatory-time ledger with fortnight locking
//! - `clock` - Injectable wall clock

pub mod clock;
pub mod ledger;

pub use clock::{Clock, FixedClock, SystemClock};
