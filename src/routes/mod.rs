//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router carries the websocket relay at `/ws`, the health probe,
//! the admin port route, and the static audience page as the fallback. The
//! same router is served by whichever listener the supervisor has active.

pub mod admin;
pub mod ws;

use std::path::Path;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, put};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full router. `public_dir` holds the audience page.
pub fn app(state: AppState, public_dir: &Path) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    let api = Router::new()
        .route("/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .route("/api/port", put(admin::rebind_port))
        .layer(cors)
        .with_state(state);

    let audience_page = Router::new()
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(CompressionLayer::new());

    api.merge(audience_page).layer(TraceLayer::new_for_http())
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
