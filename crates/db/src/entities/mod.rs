//! `SeaORM` entities.

pub mod hour_bank_entries;
pub mod worker_hour_settings;
