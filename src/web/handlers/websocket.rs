//! WebSocket upgrade and per-session loop.
//!
//! Each connection is one tokio task that owns the socket: it drains the
//! session's command channel (deliveries and close requests) and processes
//! inbound frames strictly in order.

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;

use crate::core::identity::Identity;
use crate::core::presence::{SessionCommand, SessionHandle};
use crate::core::relay::{InboundEvent, OutboundEvent};
use crate::web::state::AppState;
use crate::web::utils::api_error;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Response {
    let identity = Identity::normalize(&username);
    if identity.is_empty() {
        return api_error(StatusCode::BAD_REQUEST, "username must not be empty");
    }
    ws.on_upgrade(move |socket| session_loop(socket, state, identity))
}

async fn session_loop(mut socket: WebSocket, state: AppState, identity: Identity) {
    let (handle, mut commands) = SessionHandle::create();
    let session_id = handle.session_id();
    state.registry.bind(identity.clone(), handle.clone());
    tracing::info!(user = %identity, session_id, "session connected");

    loop {
        tokio::select! {
            command = commands.recv() => {
                match command {
                    Some(SessionCommand::Deliver(event)) => {
                        let Ok(json) = serde_json::to_string(&event) else {
                            continue;
                        };
                        if socket.send(WsMessage::Text(json)).await.is_err() {
                            break; // client gone
                        }
                    }
                    // Displaced by a newer session, or the handle side hung up.
                    Some(SessionCommand::Close) | None => {
                        let _ = socket.send(WsMessage::Close(None)).await;
                        break;
                    }
                }
            }
            frame = socket.recv() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_frame(&state, &identity, &handle, &text).await;
                    }
                    Some(Ok(WsMessage::Ping(payload))) => {
                        let _ = socket.send(WsMessage::Pong(payload)).await;
                    }
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    _ => {} // ignore binary and pong frames
                }
            }
        }
    }

    // Only evict our own binding; a newer session may already own the name.
    state.registry.unbind(&identity, session_id);
    tracing::info!(user = %identity, session_id, "session disconnected");
}

async fn handle_frame(state: &AppState, identity: &Identity, handle: &SessionHandle, text: &str) {
    match serde_json::from_str::<InboundEvent>(text) {
        Ok(InboundEvent::Send { to, text }) => {
            if let Err(err) = state.relay.handle_message(identity, handle, &to, &text).await {
                tracing::error!(user = %identity, error = %err, "message processing failed");
                let _ = handle.send(OutboundEvent::bot(
                    "Something went wrong while processing your message. Please try again.",
                ));
            }
        }
        Err(err) => {
            tracing::warn!(user = %identity, error = %err, "rejected malformed payload");
            let _ = handle.send(OutboundEvent::bot_info(
                r#"Invalid payload. Expected {"type": "send", "to": ..., "text": ...}."#,
            ));
        }
    }
}
