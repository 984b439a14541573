//! Presence listing.

use axum::extract::State;
use axum::Json;

use crate::web::state::AppState;

pub async fn presence_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "active": state.registry.list_active() }))
}
