//! Event API endpoints

use api_types::{
    event::{EventDetail, EventNew, EventStatus, EventView, EventsResponse},
    member::{MemberNew, MemberView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{CurrentMember, ServerError, server::ServerState};

fn event_view(event: engine::Event) -> EventView {
    EventView {
        id: event.id,
        name: event.name,
        status: match event.status {
            engine::EventStatus::Open => EventStatus::Open,
            engine::EventStatus::Confirmed => EventStatus::Confirmed,
        },
        created_by: event.created_by,
        created_at: event.created_at,
    }
}

fn member_view(member: engine::Member) -> MemberView {
    MemberView {
        id: member.id,
        name: member.name,
    }
}

/// Handle requests for creating a new event owned by the caller
pub async fn create(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Json(payload): Json<EventNew>,
) -> Result<(StatusCode, Json<EventView>), ServerError> {
    let event = state.engine.new_event(&payload.name, &user_id).await?;
    Ok((StatusCode::CREATED, Json(event_view(event))))
}

/// Handle requests for listing the caller's events
pub async fn list(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
) -> Result<Json<EventsResponse>, ServerError> {
    let events = state
        .engine
        .list_events(&user_id)
        .await?
        .into_iter()
        .map(event_view)
        .collect();
    Ok(Json(EventsResponse { events }))
}

pub async fn get(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> Result<Json<EventDetail>, ServerError> {
    let snapshot = state.engine.event_snapshot(&event_id, &user_id).await?;
    Ok(Json(EventDetail {
        event: event_view(snapshot.event),
        members: snapshot.members.into_iter().map(member_view).collect(),
    }))
}

/// Owner-only.
pub async fn add_member(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
    Json(payload): Json<MemberNew>,
) -> Result<(StatusCode, Json<MemberView>), ServerError> {
    let member = state
        .engine
        .add_event_member(&event_id, &payload.username, &user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(member_view(member))))
}

/// Owner-only.
pub async fn remove(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_event(&event_id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
