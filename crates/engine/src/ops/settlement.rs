use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, EventStatus, Member, Payment, ResultEngine, SettlementStore, SplitResult,
    Transfer, TransferStatus, calculate_split, events, settlement, transfers, util::parse_uuid,
};

use super::{Engine, access::ensure_confirmed, with_tx};

impl Engine {
    /// Balances and transfer plan of the event as of now. Nothing is stored.
    pub async fn preview_split(&self, event_id: &str, user_id: &str) -> ResultEngine<SplitResult> {
        let event = self
            .require_event_member(&self.database, event_id, user_id)
            .await?;
        let members = self.members_of(&self.database, event.id).await?;
        let payments: Vec<Payment> = self
            .payments_of(&self.database, event.id)
            .await?
            .iter()
            .map(|record| record.payment())
            .collect();
        settlement::split(&event.id.to_string(), &members, &payments)
    }

    /// Computes and stores the transfers of the event, then flags it
    /// confirmed. Both writes share one transaction.
    ///
    /// Confirming an already confirmed event recomputes the same plan.
    pub async fn confirm_settlement(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> ResultEngine<SplitResult> {
        with_tx!(self, |db_tx| {
            let event = self.require_event_member(&db_tx, event_id, user_id).await?;
            let store = EventStore::new(self, &db_tx);
            let result = calculate_split(&store, &event.id.to_string()).await?;
            self.set_event_status(&db_tx, event.id, EventStatus::Confirmed)
                .await?;
            tracing::info!(event_id = %event.id, by = user_id, "settlement confirmed");
            Ok(result)
        })
    }

    /// Drops the stored transfers and reopens the event.
    pub async fn cancel_settlement(&self, event_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let event = self.require_event_member(&db_tx, event_id, user_id).await?;
            ensure_confirmed(&event)?;
            EventStore::new(self, &db_tx)
                .delete_transfers(&event.id.to_string())
                .await?;
            self.set_event_status(&db_tx, event.id, EventStatus::Open)
                .await?;
            tracing::info!(event_id = %event.id, by = user_id, "settlement cancelled");
            Ok(())
        })
    }

    async fn set_event_status<C: ConnectionTrait>(
        &self,
        db: &C,
        event_id: Uuid,
        status: EventStatus,
    ) -> ResultEngine<()> {
        events::ActiveModel {
            id: ActiveValue::Unchanged(event_id.to_string()),
            status: ActiveValue::Set(status.as_str().to_string()),
            ..Default::default()
        }
        .update(db)
        .await?;
        Ok(())
    }
}

/// [`SettlementStore`] bound to one connection or transaction. Writes do
/// not open a transaction of their own.
struct EventStore<'a, C> {
    engine: &'a Engine,
    db: &'a C,
}

impl<'a, C: ConnectionTrait> EventStore<'a, C> {
    fn new(engine: &'a Engine, db: &'a C) -> Self {
        Self { engine, db }
    }

    async fn require_event(&self, event_id: &str) -> ResultEngine<Uuid> {
        let event_uuid = parse_uuid(event_id, "event")?;
        if self.engine.find_event(self.db, event_uuid).await?.is_none() {
            return Err(EngineError::KeyNotFound("event not exists".to_string()));
        }
        Ok(event_uuid)
    }
}

impl<C: ConnectionTrait> SettlementStore for EventStore<'_, C> {
    async fn event_members(&self, event_id: &str) -> ResultEngine<Vec<Member>> {
        let event_uuid = self.require_event(event_id).await?;
        self.engine.members_of(self.db, event_uuid).await
    }

    async fn event_payments(&self, event_id: &str) -> ResultEngine<Vec<Payment>> {
        let event_uuid = self.require_event(event_id).await?;
        Ok(self
            .engine
            .payments_of(self.db, event_uuid)
            .await?
            .iter()
            .map(|record| record.payment())
            .collect())
    }

    /// Rows are keyed by `(event_id, from, to)`. Existing rows keep their
    /// status and only get a new amount; pairs missing from `plan` are
    /// removed.
    async fn upsert_transfers(&self, event_id: &str, plan: &[Transfer]) -> ResultEngine<()> {
        let event_key = parse_uuid(event_id, "event")?.to_string();
        let now = Utc::now();
        let mut planned = HashSet::with_capacity(plan.len());
        for transfer in plan {
            planned.insert((transfer.from.as_str(), transfer.to.as_str()));
            let key = (
                event_key.clone(),
                transfer.from.clone(),
                transfer.to.clone(),
            );
            match transfers::Entity::find_by_id(key).one(self.db).await? {
                Some(existing) if existing.amount == transfer.amount => {}
                Some(existing) => {
                    let mut active: transfers::ActiveModel = existing.into();
                    active.amount = ActiveValue::Set(transfer.amount);
                    active.updated_at = ActiveValue::Set(now);
                    active.update(self.db).await?;
                }
                None => {
                    transfers::ActiveModel {
                        event_id: ActiveValue::Set(event_key.clone()),
                        from_user: ActiveValue::Set(transfer.from.clone()),
                        to_user: ActiveValue::Set(transfer.to.clone()),
                        amount: ActiveValue::Set(transfer.amount),
                        status: ActiveValue::Set(TransferStatus::Pending.as_str().to_string()),
                        updated_at: ActiveValue::Set(now),
                    }
                    .insert(self.db)
                    .await?;
                }
            }
        }

        let stale: Vec<transfers::Model> = transfers::Entity::find()
            .filter(transfers::Column::EventId.eq(event_key.clone()))
            .all(self.db)
            .await?
            .into_iter()
            .filter(|row| !planned.contains(&(row.from_user.as_str(), row.to_user.as_str())))
            .collect();
        for row in stale {
            transfers::Entity::delete_by_id((row.event_id, row.from_user, row.to_user))
                .exec(self.db)
                .await?;
        }
        Ok(())
    }

    async fn delete_transfers(&self, event_id: &str) -> ResultEngine<()> {
        let event_uuid = parse_uuid(event_id, "event")?;
        transfers::Entity::delete_many()
            .filter(transfers::Column::EventId.eq(event_uuid.to_string()))
            .exec(self.db)
            .await?;
        Ok(())
    }
}

/// Reads go straight to the database, writes run in their own transaction.
impl SettlementStore for Engine {
    async fn event_members(&self, event_id: &str) -> ResultEngine<Vec<Member>> {
        EventStore::new(self, &self.database)
            .event_members(event_id)
            .await
    }

    async fn event_payments(&self, event_id: &str) -> ResultEngine<Vec<Payment>> {
        EventStore::new(self, &self.database)
            .event_payments(event_id)
            .await
    }

    async fn upsert_transfers(&self, event_id: &str, plan: &[Transfer]) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            EventStore::new(self, &db_tx)
                .upsert_transfers(event_id, plan)
                .await
        })
    }

    async fn delete_transfers(&self, event_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            EventStore::new(self, &db_tx)
                .delete_transfers(event_id)
                .await
        })
    }
}
