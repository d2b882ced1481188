//! Shared identifiers and configuration for the hour bank.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for workers and ledger entries
//! - Configuration management

pub mod config;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, LedgerConfig};
