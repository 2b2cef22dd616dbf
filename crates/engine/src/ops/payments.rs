use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Member, NewPayment, PaymentRecord, ResultEngine, payments, util,
};

use super::{Engine, access::ensure_open, with_tx};

/// Checks payer and participants against the event members.
///
/// Participants are trimmed; duplicates and strangers are rejected.
fn validate_parties(
    members: &[Member],
    payer: &str,
    participants: &[String],
) -> ResultEngine<(String, Vec<String>)> {
    let is_member = |id: &str| members.iter().any(|m| m.id == id);

    let payer = payer.trim();
    if !is_member(payer) {
        return Err(EngineError::InvalidMember(format!(
            "payer {payer} is not a member of the event"
        )));
    }

    let mut seen = HashSet::new();
    let mut subset = Vec::with_capacity(participants.len());
    for participant in participants {
        let participant = participant.trim();
        if !is_member(participant) {
            return Err(EngineError::InvalidMember(format!(
                "participant {participant} is not a member of the event"
            )));
        }
        if !seen.insert(participant) {
            return Err(EngineError::InvalidMember(format!(
                "participant {participant} listed twice"
            )));
        }
        subset.push(participant.to_string());
    }
    Ok((payer.to_string(), subset))
}

impl Engine {
    /// Records a payment on an open event.
    pub async fn add_payment(
        &self,
        event_id: &str,
        payment: NewPayment,
        user_id: &str,
    ) -> ResultEngine<PaymentRecord> {
        let amount = util::validate_amount(payment.amount)?;
        with_tx!(self, |db_tx| {
            let event = self.require_event_member(&db_tx, event_id, user_id).await?;
            ensure_open(&event)?;
            let members = self.members_of(&db_tx, event.id).await?;
            let (payer, participants) =
                validate_parties(&members, &payment.payer, &payment.participants)?;

            let record = PaymentRecord {
                id: Uuid::new_v4(),
                event_id: event.id,
                payer,
                amount,
                participants,
                note: util::normalize_optional_text(payment.note.as_deref()),
                created_by: user_id.to_string(),
                created_at: Utc::now(),
            };
            payments::ActiveModel::try_from(&record)?
                .insert(&db_tx)
                .await?;
            tracing::info!(
                event_id = %event.id,
                payment_id = %record.id,
                amount = record.amount,
                "payment recorded"
            );
            Ok(record)
        })
    }

    /// Payments of the event in creation order.
    pub async fn list_payments(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<PaymentRecord>> {
        let event = self
            .require_event_member(&self.database, event_id, user_id)
            .await?;
        self.payments_of(&self.database, event.id).await
    }

    /// Removes a payment from an open event. Any event member may do it.
    pub async fn delete_payment(
        &self,
        event_id: &str,
        payment_id: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        let payment_uuid = util::parse_uuid(payment_id, "payment")?;
        with_tx!(self, |db_tx| {
            let event = self.require_event_member(&db_tx, event_id, user_id).await?;
            ensure_open(&event)?;

            let res = payments::Entity::delete_many()
                .filter(payments::Column::Id.eq(payment_uuid.to_string()))
                .filter(payments::Column::EventId.eq(event.id.to_string()))
                .exec(&db_tx)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::KeyNotFound("payment not exists".to_string()));
            }
            tracing::info!(event_id = %event.id, payment_id = %payment_uuid, "payment deleted");
            Ok(())
        })
    }

    pub(super) async fn payments_of<C: sea_orm::ConnectionTrait>(
        &self,
        db: &C,
        event_id: Uuid,
    ) -> ResultEngine<Vec<PaymentRecord>> {
        payments::Entity::find()
            .filter(payments::Column::EventId.eq(event_id.to_string()))
            .order_by_asc(payments::Column::CreatedAt)
            .order_by_asc(payments::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(PaymentRecord::try_from)
            .collect()
    }
}
