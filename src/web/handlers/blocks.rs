//! Manual block management endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;

use crate::core::identity::Identity;
use crate::core::relay::BlockStore;
use crate::web::state::AppState;
use crate::web::utils::api_error;

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    victim: String,
    offender: String,
}

fn normalize_pair(req: &BlockRequest) -> Result<(Identity, Identity), Response> {
    let victim = Identity::normalize(&req.victim);
    let offender = Identity::normalize(&req.offender);
    if victim.is_empty() || offender.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "victim and offender must not be empty",
        ));
    }
    Ok((victim, offender))
}

pub async fn block_handler(
    State(state): State<AppState>,
    Form(req): Form<BlockRequest>,
) -> Response {
    let (victim, offender) = match normalize_pair(&req) {
        Ok(pair) => pair,
        Err(response) => return response,
    };
    match state.blocks.block(&victim, &offender).await {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({ "status": "ok" })),
        )
            .into_response(),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to block: {e}"),
        ),
    }
}

pub async fn unblock_handler(
    State(state): State<AppState>,
    Form(req): Form<BlockRequest>,
) -> Response {
    let (victim, offender) = match normalize_pair(&req) {
        Ok(pair) => pair,
        Err(response) => return response,
    };
    match state.blocks.unblock(&victim, &offender).await {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({ "status": "ok" })),
        )
            .into_response(),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to unblock: {e}"),
        ),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListBlockedQuery {
    victim: String,
}

pub async fn list_blocked_handler(
    State(state): State<AppState>,
    Query(query): Query<ListBlockedQuery>,
) -> Response {
    let victim = Identity::normalize(&query.victim);
    if victim.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "victim must not be empty");
    }
    match state.blocks.list_blocked(&victim).await {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(e) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to list blocks: {e}"),
        ),
    }
}
