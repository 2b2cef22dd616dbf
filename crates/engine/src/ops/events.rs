use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Event, EventSnapshot, Member, ResultEngine, event_members, events, payments,
    transfers, util,
};

use super::{Engine, access::ensure_open, with_tx};

impl Engine {
    /// Creates an event owned by `user_id`, who also becomes its first member.
    pub async fn new_event(&self, name: &str, user_id: &str) -> ResultEngine<Event> {
        let name = util::required_name(name, "event name")?;
        let now = Utc::now();
        let event = Event::new(name, user_id.to_string(), now);
        let event_model: events::ActiveModel = (&event).into();

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            event_model.insert(&db_tx).await?;
            event_members::ActiveModel {
                event_id: ActiveValue::Set(event.id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                joined_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(event_id = %event.id, owner = user_id, "event created");
            Ok(event)
        })
    }

    /// Return the event header plus its members.
    pub async fn event_snapshot(&self, event_id: &str, user_id: &str) -> ResultEngine<EventSnapshot> {
        let event = self
            .require_event_member(&self.database, event_id, user_id)
            .await?;
        let members = self.members_of(&self.database, event.id).await?;
        Ok(EventSnapshot { event, members })
    }

    /// Events `user_id` belongs to, oldest first.
    pub async fn list_events(&self, user_id: &str) -> ResultEngine<Vec<Event>> {
        let event_ids: Vec<String> = event_members::Entity::find()
            .filter(event_members::Column::UserId.eq(user_id.to_string()))
            .all(&self.database)
            .await?
            .into_iter()
            .map(|membership| membership.event_id)
            .collect();
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        events::Entity::find()
            .filter(events::Column::Id.is_in(event_ids))
            .order_by_asc(events::Column::CreatedAt)
            .order_by_asc(events::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Event::try_from)
            .collect()
    }

    /// Adds `username` to the event (owner-only, event must be open).
    pub async fn add_event_member(
        &self,
        event_id: &str,
        username: &str,
        user_id: &str,
    ) -> ResultEngine<Member> {
        let username = username.trim();
        with_tx!(self, |db_tx| {
            let event = self.require_event_owner(&db_tx, event_id, user_id).await?;
            ensure_open(&event)?;
            let user = self.require_user_exists(&db_tx, username).await?;
            if self.is_event_member(&db_tx, event.id, username).await? {
                return Err(EngineError::ExistingKey(username.to_string()));
            }

            event_members::ActiveModel {
                event_id: ActiveValue::Set(event.id.to_string()),
                user_id: ActiveValue::Set(user.username.clone()),
                joined_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(event_id = %event.id, member = username, "member added");

            let name = user.display_name.unwrap_or_else(|| user.username.clone());
            Ok(Member::with_name(user.username, name))
        })
    }

    pub async fn list_event_members(
        &self,
        event_id: &str,
        user_id: &str,
    ) -> ResultEngine<Vec<Member>> {
        let event = self
            .require_event_member(&self.database, event_id, user_id)
            .await?;
        self.members_of(&self.database, event.id).await
    }

    /// Removes the event together with its members, payments and transfers.
    /// Owner-only, allowed in any status.
    pub async fn delete_event(&self, event_id: &str, user_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let event = self.require_event_owner(&db_tx, event_id, user_id).await?;
            let event_key = event.id.to_string();

            transfers::Entity::delete_many()
                .filter(transfers::Column::EventId.eq(event_key.clone()))
                .exec(&db_tx)
                .await?;
            payments::Entity::delete_many()
                .filter(payments::Column::EventId.eq(event_key.clone()))
                .exec(&db_tx)
                .await?;
            event_members::Entity::delete_many()
                .filter(event_members::Column::EventId.eq(event_key.clone()))
                .exec(&db_tx)
                .await?;
            events::Entity::delete_by_id(event_key).exec(&db_tx).await?;

            tracing::info!(event_id = %event.id, by = user_id, "event deleted");
            Ok(())
        })
    }
}
