//! Escalation settings endpoint (settings collaborator).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::core::escalation::Sensitivity;
use crate::core::identity::Identity;
use crate::core::relay::SettingsStore;
use crate::web::state::AppState;
use crate::web::utils::api_error;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    username: String,
    #[serde(default)]
    sensitivity: Option<String>,
}

pub async fn update_settings_handler(
    State(state): State<AppState>,
    Form(req): Form<UpdateSettingsRequest>,
) -> Response {
    let victim = Identity::normalize(&req.username);
    if victim.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "username must not be empty");
    }

    let sensitivity = Sensitivity::parse_or_default(req.sensitivity.as_deref().unwrap_or("medium"));
    match state.settings.upsert(&victim, sensitivity).await {
        Ok(saved) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({
                "status": "ok",
                "username": victim.to_string(),
                "sensitivity": saved.sensitivity.as_str(),
                "warn_threshold": saved.warn_threshold,
                "block_threshold": saved.block_threshold,
            })),
        )
            .into_response(),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to save settings: {e}"),
        ),
    }
}
