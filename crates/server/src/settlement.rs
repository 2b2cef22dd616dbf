//! Settlement API endpoints: preview, confirm and cancel.

use api_types::settlement::{BalanceView, SplitResponse, TransactionView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::SplitResult;

use crate::{CurrentMember, ServerError, server::ServerState};

fn split_response(result: SplitResult) -> SplitResponse {
    SplitResponse {
        transactions: result
            .transactions
            .into_iter()
            .map(|t| TransactionView {
                from: t.from,
                to: t.to,
                amount: t.amount,
            })
            .collect(),
        balances: result
            .balances
            .into_iter()
            .map(|b| BalanceView {
                member: b.member,
                name: b.name,
                balance: b.balance,
            })
            .collect(),
    }
}

/// Balances and transfer plan without storing anything
pub async fn preview(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> Result<Json<SplitResponse>, ServerError> {
    let result = state.engine.preview_split(&event_id, &user_id).await?;
    Ok(Json(split_response(result)))
}

pub async fn confirm(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> Result<Json<SplitResponse>, ServerError> {
    let result = state.engine.confirm_settlement(&event_id, &user_id).await?;
    Ok(Json(split_response(result)))
}

pub async fn cancel(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state.engine.cancel_settlement(&event_id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
