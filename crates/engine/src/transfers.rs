//! Persisted transfers ("who pays whom") of a confirmed event.
//!
//! Rows are keyed by `(event_id, from_user, to_user)`; recalculating a
//! settlement updates the amount in place instead of appending rows.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, TransferStatus, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferRecord {
    pub event_id: Uuid,
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub status: TransferStatus,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub event_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub from_user: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub to_user: String,
    pub amount: f64,
    pub status: String,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Events,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for TransferRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            event_id: parse_uuid(&model.event_id, "event")?,
            from: model.from_user,
            to: model.to_user,
            amount: model.amount,
            status: TransferStatus::try_from(model.status.as_str())?,
            updated_at: model.updated_at,
        })
    }
}
