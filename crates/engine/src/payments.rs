//! Recorded payments.
//!
//! The participant subset is stored as a JSON array of member ids; an empty
//! array means the cost is shared by the whole event.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Payment, ResultEngine, util::parse_uuid};

/// Input of [`Engine::add_payment`](crate::Engine::add_payment).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub payer: String,
    pub amount: f64,
    #[serde(default)]
    pub participants: Vec<String>,
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub event_id: Uuid,
    pub payer: String,
    pub amount: f64,
    pub participants: Vec<String>,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    /// The part of the record the balance calculator works on.
    pub fn payment(&self) -> Payment {
        Payment {
            payer: self.payer.clone(),
            amount: self.amount,
            participants: self.participants.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub event_id: String,
    pub payer_id: String,
    pub amount: f64,
    pub participants: String,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
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

pub(crate) fn encode_participants(participants: &[String]) -> ResultEngine<String> {
    serde_json::to_string(participants)
        .map_err(|err| EngineError::InvalidMember(format!("invalid participants: {err}")))
}

/// Decodes the stored participant list. Blank or `null` columns mean "all
/// members".
pub(crate) fn decode_participants(raw: &str) -> ResultEngine<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
        .map_err(|err| EngineError::InvalidMember(format!("invalid participants: {err}")))
}

impl TryFrom<&PaymentRecord> for ActiveModel {
    type Error = EngineError;

    fn try_from(record: &PaymentRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActiveValue::Set(record.id.to_string()),
            event_id: ActiveValue::Set(record.event_id.to_string()),
            payer_id: ActiveValue::Set(record.payer.clone()),
            amount: ActiveValue::Set(record.amount),
            participants: ActiveValue::Set(encode_participants(&record.participants)?),
            note: ActiveValue::Set(record.note.clone()),
            created_by: ActiveValue::Set(record.created_by.clone()),
            created_at: ActiveValue::Set(record.created_at),
        })
    }
}

impl TryFrom<Model> for PaymentRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            event_id: parse_uuid(&model.event_id, "event")?,
            payer: model.payer_id,
            amount: model.amount,
            participants: decode_participants(&model.participants)?,
            note: model.note,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
