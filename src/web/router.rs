//! Axum router construction.

use axum::routing::{get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Build the complete router: the WebSocket session endpoint plus the JSON
/// endpoints used by the settings, reporting, and evidence collaborators.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/presence", get(handlers::presence::presence_handler))
        .route("/settings", post(handlers::settings::update_settings_handler))
        .route("/block", post(handlers::blocks::block_handler))
        .route("/unblock", post(handlers::blocks::unblock_handler))
        .route("/blocked", get(handlers::blocks::list_blocked_handler))
        .route("/incidents", get(handlers::incidents::list_incidents_handler))
        .route(
            "/upload_screenshot",
            post(handlers::evidence::upload_screenshot_handler),
        )
        .route("/ws/:username", get(handlers::websocket::ws_handler))
        .with_state(state)
}
