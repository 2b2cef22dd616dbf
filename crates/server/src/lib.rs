use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{CurrentMember, ServerState, app, run_with_listener};

mod events;
mod payments;
mod server;
mod settlement;
mod transfers;

pub mod types {
    pub mod event {
        pub use api_types::event::{EventDetail, EventNew, EventStatus, EventView, EventsResponse};
        pub use api_types::member::{MemberNew, MemberView};
    }

    pub mod payment {
        pub use api_types::payment::{PaymentNew, PaymentView, PaymentsResponse};
    }

    pub mod settlement {
        pub use api_types::settlement::{BalanceView, SplitResponse, TransactionView};
    }

    pub mod transfer {
        pub use api_types::transfer::{
            TransferStatus, TransferStatusUpdate, TransferView, TransfersResponse,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::InvalidState(_)
        | EngineError::InvalidTransition(_) => StatusCode::CONFLICT,
        EngineError::Database(_) | EngineError::Consistency(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidId(_)
        | EngineError::InvalidAmount(_)
        | EngineError::InvalidMember(_)
        | EngineError::NoParticipants(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Consistency(msg) => {
            tracing::error!("settlement consistency error: {msg}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
