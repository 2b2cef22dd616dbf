//! Events: a trip or an outing whose members share costs.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, EventStatus, Member, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub status: EventStatus,
    /// Owner of the event. Only the owner manages members.
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn new(name: String, created_by: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            status: EventStatus::Open,
            created_by,
            created_at,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == EventStatus::Confirmed
    }
}

/// Event header plus its members.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub event: Event,
    pub members: Vec<Member>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Event> for ActiveModel {
    fn from(event: &Event) -> Self {
        Self {
            id: ActiveValue::Set(event.id.to_string()),
            name: ActiveValue::Set(event.name.clone()),
            status: ActiveValue::Set(event.status.as_str().to_string()),
            created_by: ActiveValue::Set(event.created_by.clone()),
            created_at: ActiveValue::Set(event.created_at),
        }
    }
}

impl TryFrom<Model> for Event {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "event")?,
            name: model.name,
            status: EventStatus::try_from(model.status.as_str())?,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
