//! Incident feed for the reporting/dashboard collaborator. Read-only.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::core::relay::IncidentStore;
use crate::web::state::AppState;
use crate::web::utils::api_error;

const INCIDENT_FEED_LIMIT: u32 = 100;

pub async fn list_incidents_handler(State(state): State<AppState>) -> Response {
    match state.incidents.list_recent(INCIDENT_FEED_LIMIT).await {
        Ok(incidents) => (StatusCode::OK, axum::Json(incidents)).into_response(),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to list incidents: {e}"),
        ),
    }
}
