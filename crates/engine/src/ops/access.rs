use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Event, Member, ResultEngine, event_members, events, users, util::parse_uuid,
};

use super::Engine;

impl Engine {
    pub(super) async fn find_event<C: ConnectionTrait>(
        &self,
        db: &C,
        event_id: Uuid,
    ) -> ResultEngine<Option<Event>> {
        events::Entity::find_by_id(event_id.to_string())
            .one(db)
            .await?
            .map(Event::try_from)
            .transpose()
    }

    pub(super) async fn is_event_member<C: ConnectionTrait>(
        &self,
        db: &C,
        event_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<bool> {
        event_members::Entity::find_by_id((event_id.to_string(), user_id.to_string()))
            .one(db)
            .await
            .map(|model| model.is_some())
            .map_err(Into::into)
    }

    /// Loads the event if `user_id` belongs to it.
    ///
    /// Non-members get the same error as a missing event, so ids of foreign
    /// events are not disclosed.
    pub(super) async fn require_event_member<C: ConnectionTrait>(
        &self,
        db: &C,
        event_id: &str,
        user_id: &str,
    ) -> ResultEngine<Event> {
        let event_uuid = parse_uuid(event_id, "event")?;
        let event = self
            .find_event(db, event_uuid)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("event not exists".to_string()))?;
        if !self.is_event_member(db, event_uuid, user_id).await? {
            return Err(EngineError::KeyNotFound("event not exists".to_string()));
        }
        Ok(event)
    }

    pub(super) async fn require_event_owner<C: ConnectionTrait>(
        &self,
        db: &C,
        event_id: &str,
        user_id: &str,
    ) -> ResultEngine<Event> {
        let event = self.require_event_member(db, event_id, user_id).await?;
        if event.created_by != user_id {
            return Err(EngineError::Forbidden(
                "only the event owner can do this".to_string(),
            ));
        }
        Ok(event)
    }

    pub(super) async fn require_user_exists<C: ConnectionTrait>(
        &self,
        db: &C,
        username: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(username.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    /// Members of the event in joining order, with their display names.
    pub(super) async fn members_of<C: ConnectionTrait>(
        &self,
        db: &C,
        event_id: Uuid,
    ) -> ResultEngine<Vec<Member>> {
        let rows = event_members::Entity::find()
            .filter(event_members::Column::EventId.eq(event_id.to_string()))
            .order_by_asc(event_members::Column::JoinedAt)
            .order_by_asc(event_members::Column::UserId)
            .find_also_related(users::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(membership, user)| {
                let name = user
                    .and_then(|u| u.display_name)
                    .unwrap_or_else(|| membership.user_id.clone());
                Member::with_name(membership.user_id, name)
            })
            .collect())
    }
}

/// Payments and members can only change while no settlement is stored.
pub(super) fn ensure_open(event: &Event) -> ResultEngine<()> {
    if event.is_confirmed() {
        return Err(EngineError::InvalidState(
            "event settlement is confirmed, cancel it first".to_string(),
        ));
    }
    Ok(())
}

pub(super) fn ensure_confirmed(event: &Event) -> ResultEngine<()> {
    if !event.is_confirmed() {
        return Err(EngineError::InvalidState(
            "event settlement is not confirmed".to_string(),
        ));
    }
    Ok(())
}
