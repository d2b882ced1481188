//! Hour bank repository for database operations.
//!
//! Implements the ledger's `TransactionLog` using SeaORM.

use chrono::Utc;
use hourbank_core::ledger::{
    EntryKind, EntryPatch, LedgerEntry, NewLedgerEntry, OwnerSettings, StoreError, TransactionLog,
};
use hourbank_shared::types::{LedgerEntryId, WorkerId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;

use crate::entities::{hour_bank_entries, worker_hour_settings};

/// PostgreSQL-backed hour bank repository.
#[derive(Debug, Clone)]
pub struct HourBankRepository {
    db: DatabaseConnection,
}

impl HourBankRepository {
    /// Create a new hour bank repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates or replaces the settings of a worker.
    pub async fn save_settings(
        &self,
        owner: WorkerId,
        settings: &OwnerSettings,
    ) -> Result<(), StoreError> {
        let now = Utc::now().into();
        let existing = worker_hour_settings::Entity::find_by_id(owner.into_inner())
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?;

        match existing {
            Some(model) => {
                let mut active: worker_hour_settings::ActiveModel = model.into();
                active.hourly_rate = Set(settings.hourly_rate);
                active.balance_ceiling = Set(settings.balance_ceiling);
                active.updated_at = Set(now);
                active.update(&self.db).await.map_err(StoreError::backend)?;
            }
            None => {
                worker_hour_settings::ActiveModel {
                    worker_id: Set(owner.into_inner()),
                    hourly_rate: Set(settings.hourly_rate),
                    balance_ceiling: Set(settings.balance_ceiling),
                    updated_at: Set(now),
                }
                .insert(&self.db)
                .await
                .map_err(StoreError::backend)?;
            }
        }

        Ok(())
    }
}

impl TransactionLog for HourBankRepository {
    async fn list_entries(&self, owner: WorkerId) -> Result<Vec<LedgerEntry>, StoreError> {
        let models = hour_bank_entries::Entity::find()
            .filter(hour_bank_entries::Column::WorkerId.eq(owner.into_inner()))
            .order_by_desc(hour_bank_entries::Column::CreatedAt)
            .order_by_desc(hour_bank_entries::Column::Id)
            .all(&self.db)
            .await
            .map_err(StoreError::backend)?;

        debug!(owner = %owner, rows = models.len(), "Hour bank entries fetched");

        models.into_iter().map(to_domain).collect()
    }

    async fn insert_entry(&self, input: NewLedgerEntry) -> Result<LedgerEntry, StoreError> {
        let now = Utc::now().into();
        let active_model = hour_bank_entries::ActiveModel {
            id: Set(LedgerEntryId::new().into_inner()),
            worker_id: Set(input.owner_id.into_inner()),
            hours: Set(input.hours),
            kind: Set(input.kind.as_str().to_string()),
            note: Set(input.note),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(StoreError::backend)?;

        to_domain(model)
    }

    async fn update_entry(&self, id: LedgerEntryId, patch: EntryPatch) -> Result<(), StoreError> {
        let model = hour_bank_entries::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?
            .ok_or(StoreError::NotFound(id))?;

        let mut active: hour_bank_entries::ActiveModel = model.into();
        if let Some(hours) = patch.hours {
            active.hours = Set(hours);
        }
        if let Some(note) = patch.note {
            active.note = Set(Some(note));
        }
        active.updated_at = Set(Utc::now().into());

        active.update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => StoreError::NotFound(id),
            other => StoreError::backend(other),
        })?;

        Ok(())
    }

    async fn delete_entry(&self, id: LedgerEntryId) -> Result<(), StoreError> {
        let result = hour_bank_entries::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(StoreError::backend)?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn owner_settings(&self, owner: WorkerId) -> Result<Option<OwnerSettings>, StoreError> {
        let model = worker_hour_settings::Entity::find_by_id(owner.into_inner())
            .one(&self.db)
            .await
            .map_err(StoreError::backend)?;

        Ok(model.map(|m| OwnerSettings {
            hourly_rate: m.hourly_rate,
            balance_ceiling: m.balance_ceiling,
        }))
    }
}

/// Convert a database entry kind to the domain enum.
fn to_domain_kind(kind: &str) -> Result<EntryKind, StoreError> {
    match kind {
        "credit" => Ok(EntryKind::Credit),
        "debit" => Ok(EntryKind::Debit),
        other => Err(StoreError::corrupt(format!("unknown entry kind '{other}'"))),
    }
}

/// Convert database model to domain entry.
fn to_domain(model: hour_bank_entries::Model) -> Result<LedgerEntry, StoreError> {
    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(model.id),
        owner_id: WorkerId::from_uuid(model.worker_id),
        hours: model.hours,
        kind: to_domain_kind(&model.kind)?,
        note: model.note,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
