//! Hour bank tables.
//!
//! Entries reference workers by id only; the worker directory lives outside
//! this schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(ENTRIES_SQL).await?;
        db.execute_unprepared(SETTINGS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS worker_hour_settings CASCADE;")
            .await?;
        db.execute_unprepared("DROP TABLE IF EXISTS hour_bank_entries CASCADE;")
            .await?;
        Ok(())
    }
}

const ENTRIES_SQL: &str = r"
-- One signed movement of hours per row; the balance is never stored
CREATE TABLE hour_bank_entries (
    id UUID PRIMARY KEY,
    worker_id UUID NOT NULL,
    hours NUMERIC(8, 2) NOT NULL,
    kind VARCHAR(10) NOT NULL,
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_hours_positive CHECK (hours > 0),
    CONSTRAINT chk_kind CHECK (kind IN ('credit', 'debit'))
);

CREATE INDEX idx_hour_bank_entries_worker_created
    ON hour_bank_entries (worker_id, created_at DESC);
";

const SETTINGS_SQL: &str = r"
-- Per-worker rate and ceiling; a NULL ceiling uses the configured default
CREATE TABLE worker_hour_settings (
    worker_id UUID PRIMARY KEY,
    hourly_rate NUMERIC(12, 2) NOT NULL DEFAULT 0,
    balance_ceiling NUMERIC(8, 2),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_hourly_rate_non_negative CHECK (hourly_rate >= 0),
    CONSTRAINT chk_balance_ceiling_non_negative CHECK (balance_ceiling IS NULL OR balance_ceiling >= 0)
);
";
