//! Transfer API endpoints

use api_types::transfer::{TransferStatus, TransferStatusUpdate, TransferView, TransfersResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::TransferRecord;

use crate::{CurrentMember, ServerError, server::ServerState};

fn to_api_status(status: engine::TransferStatus) -> TransferStatus {
    match status {
        engine::TransferStatus::Pending => TransferStatus::Pending,
        engine::TransferStatus::Checking => TransferStatus::Checking,
        engine::TransferStatus::Completed => TransferStatus::Completed,
    }
}

fn to_engine_status(status: TransferStatus) -> engine::TransferStatus {
    match status {
        TransferStatus::Pending => engine::TransferStatus::Pending,
        TransferStatus::Checking => engine::TransferStatus::Checking,
        TransferStatus::Completed => engine::TransferStatus::Completed,
    }
}

fn transfer_view(record: TransferRecord) -> TransferView {
    TransferView {
        from: record.from,
        to: record.to,
        amount: record.amount,
        status: to_api_status(record.status),
        updated_at: record.updated_at,
    }
}

pub async fn list(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> Result<Json<TransfersResponse>, ServerError> {
    let transfers = state
        .engine
        .list_transfers(&event_id, &user_id)
        .await?
        .into_iter()
        .map(transfer_view)
        .collect();
    Ok(Json(TransfersResponse { transfers }))
}

/// Debtor reports a payment, creditor confirms or rejects it.
pub async fn update_status(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
    Json(payload): Json<TransferStatusUpdate>,
) -> Result<Json<TransferView>, ServerError> {
    let record = state
        .engine
        .update_transfer_status(
            &event_id,
            &payload.from,
            &payload.to,
            to_engine_status(payload.status),
            &user_id,
        )
        .await?;
    Ok(Json(transfer_view(record)))
}
