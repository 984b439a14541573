//! Evidence upload (evidence capture collaborator).
//!
//! Stores the uploaded screenshot bytes under the evidence directory and
//! attaches the stored path to the latest incident for the originating
//! message. Upload is best-effort from the client's point of view: a
//! missing incident simply leaves nothing to attach to.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rand::RngCore;

use crate::core::relay::IncidentStore;
use crate::web::state::AppState;
use crate::web::utils::api_error;

pub async fn upload_screenshot_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut message_id: Option<i64> = None;
    let mut screenshot: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "message_id" => {
                message_id = field.text().await.ok().and_then(|v| v.trim().parse().ok());
            }
            "screenshot" => {
                screenshot = field.bytes().await.ok().map(|b| b.to_vec());
            }
            _ => {}
        }
    }

    let Some(message_id) = message_id else {
        return api_error(StatusCode::BAD_REQUEST, "message_id is required");
    };
    let Some(screenshot) = screenshot else {
        return api_error(StatusCode::BAD_REQUEST, "screenshot file is required");
    };

    let path = match store_evidence(&state.evidence_dir, &screenshot) {
        Ok(path) => path,
        Err(e) => {
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to store evidence: {e}"),
            )
        }
    };

    if let Err(e) = state.incidents.attach_screenshot(message_id, &path).await {
        return api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to attach evidence: {e}"),
        );
    }

    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok", "path": path })),
    )
        .into_response()
}

/// Write the bytes under `dir` with a random file name and return the path.
fn store_evidence(dir: &Path, bytes: &[u8]) -> anyhow::Result<String> {
    std::fs::create_dir_all(dir).context("create evidence directory")?;

    let mut name_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut name_bytes);
    let name: String = name_bytes.iter().map(|b| format!("{b:02x}")).collect();

    let path: PathBuf = dir.join(format!("{name}.png"));
    std::fs::write(&path, bytes).context("write evidence file")?;
    Ok(path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_evidence_writes_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_evidence(dir.path(), b"fake png bytes").unwrap();

        assert!(path.ends_with(".png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"fake png bytes");
    }

    #[test]
    fn store_evidence_uses_distinct_names() {
        let dir = tempfile::tempdir().unwrap();
        let first = store_evidence(dir.path(), b"a").unwrap();
        let second = store_evidence(dir.path(), b"b").unwrap();
        assert_ne!(first, second);
    }
}
