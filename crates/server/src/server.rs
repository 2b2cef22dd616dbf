use axum::{
    Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{events, payments, settlement, transfers};
use engine::{Credentials, Engine, EngineError, IdentityResolver};

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Member id of the authenticated caller, set by the auth middleware.
#[derive(Clone, Debug)]
pub struct CurrentMember(pub String);

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(TypedHeader(auth_header)) = auth_header else {
        return Err(StatusCode::UNAUTHORIZED);
    };
    if auth_header.username().is_empty() || auth_header.password().is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let credentials = Credentials {
        username: auth_header.username().to_string(),
        password: auth_header.password().to_string(),
    };
    let member_id = match state.engine.resolve_member_id(&credentials).await {
        Ok(member_id) => member_id,
        Err(EngineError::Unauthorized(_)) => return Err(StatusCode::UNAUTHORIZED),
        Err(err) => {
            tracing::error!("failed to resolve member: {err}");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(CurrentMember(member_id));
    Ok(next.run(request).await)
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/events", post(events::create).get(events::list))
        .route("/events/{event_id}", get(events::get).delete(events::remove))
        .route("/events/{event_id}/members", post(events::add_member))
        .route(
            "/events/{event_id}/payments",
            get(payments::list).post(payments::create),
        )
        .route(
            "/events/{event_id}/payments/{payment_id}",
            delete(payments::remove),
        )
        .route("/events/{event_id}/split", get(settlement::preview))
        .route(
            "/events/{event_id}/settlement",
            post(settlement::confirm).delete(settlement::cancel),
        )
        .route("/events/{event_id}/transfers", get(transfers::list))
        .route(
            "/events/{event_id}/transfers/status",
            post(transfers::update_status),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .with_state(state)
}

/// The full API with authentication, ready to be served or driven in tests.
pub fn app(engine: Engine) -> Router {
    router(ServerState {
        engine: Arc::new(engine),
    })
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(engine)).await
}
