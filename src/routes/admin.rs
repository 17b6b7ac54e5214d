//! Admin routes.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::info;

use crate::services::listener::{ListenerError, Rebind};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PortRequest {
    pub port: u16,
}

/// `PUT /api/port`: move the listener. 204 on move or no-op, 409 if the new
/// port cannot be bound.
pub async fn rebind_port(State(state): State<AppState>, Json(body): Json<PortRequest>) -> Response {
    match state.listener.rebind(body.port).await {
        Ok(Rebind::Unchanged { port }) => {
            info!(port, "rebind: already serving requested port");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(Rebind::Moved { from, to }) => {
            info!(from, to, "rebind: listener moved");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e @ ListenerError::Bind { .. }) => (StatusCode::CONFLICT, e.to_string()).into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response(),
    }
}
