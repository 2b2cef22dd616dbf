//! Payment API endpoints

use api_types::payment::{PaymentNew, PaymentView, PaymentsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{NewPayment, PaymentRecord};

use crate::{CurrentMember, ServerError, server::ServerState};

fn payment_view(record: PaymentRecord) -> PaymentView {
    PaymentView {
        id: record.id,
        payer: record.payer,
        amount: record.amount,
        participants: record.participants,
        note: record.note,
        created_by: record.created_by,
        created_at: record.created_at,
    }
}

pub async fn list(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
) -> Result<Json<PaymentsResponse>, ServerError> {
    let payments = state
        .engine
        .list_payments(&event_id, &user_id)
        .await?
        .into_iter()
        .map(payment_view)
        .collect();
    Ok(Json(PaymentsResponse { payments }))
}

pub async fn create(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path(event_id): Path<String>,
    Json(payload): Json<PaymentNew>,
) -> Result<(StatusCode, Json<PaymentView>), ServerError> {
    let record = state
        .engine
        .add_payment(
            &event_id,
            NewPayment {
                payer: payload.payer,
                amount: payload.amount,
                participants: payload.participants,
                note: payload.note,
            },
            &user_id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(payment_view(record))))
}

pub async fn remove(
    Extension(CurrentMember(user_id)): Extension<CurrentMember>,
    State(state): State<ServerState>,
    Path((event_id, payment_id)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_payment(&event_id, &payment_id, &user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
