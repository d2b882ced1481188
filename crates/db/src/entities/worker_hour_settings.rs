//! `SeaORM` Entity for worker_hour_settings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "worker_hour_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub worker_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub hourly_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((8, 2)))", nullable)]
    pub balance_ceiling: Option<Decimal>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
