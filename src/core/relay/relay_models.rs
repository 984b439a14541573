// Relay domain models - wire event enums and persisted read models.
//
// Payloads are tagged unions validated at the transport boundary; nothing
// loosely-typed crosses into the relay engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::escalation::Severity;

/// Durable-store failure. Persistence errors abort the current message's
/// processing and surface to the caller; they are never swallowed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Events a client may send over its session.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Relay `text` to the participant named `to`.
    Send { to: String, text: String },
}

/// Events pushed to a client session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// A relayed chat message (also echoed back to its sender).
    Message { from: String, text: String },
    /// Direct notice to the acting user.
    Bot { text: String },
    /// Informational notice.
    BotInfo { text: String },
    /// Side-channel instruction: capture evidence for a detected offense.
    CaptureEvidence {
        message_id: i64,
        terms: Vec<String>,
        victim: String,
    },
}

impl OutboundEvent {
    pub fn bot(text: impl Into<String>) -> Self {
        OutboundEvent::Bot { text: text.into() }
    }

    pub fn bot_info(text: impl Into<String>) -> Self {
        OutboundEvent::BotInfo { text: text.into() }
    }
}

/// One recorded offense, keyed to the message that triggered it.
#[derive(Debug, Clone, Serialize)]
pub struct Incident {
    pub id: i64,
    pub message_id: i64,
    pub sender: String,
    pub victim: String,
    pub detected_words: Vec<String>,
    pub severity: Severity,
    pub screenshot_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One row of a victim's block list.
#[derive(Debug, Clone, Serialize)]
pub struct BlockedEntry {
    pub offender: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_send_parses_from_tagged_json() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"type": "send", "to": "Bob", "text": "hi"}"#).unwrap();
        let InboundEvent::Send { to, text } = event;
        assert_eq!(to, "Bob");
        assert_eq!(text, "hi");
    }

    #[test]
    fn unknown_inbound_kind_is_rejected() {
        assert!(serde_json::from_str::<InboundEvent>(r#"{"type": "shout", "text": "hi"}"#).is_err());
        assert!(serde_json::from_str::<InboundEvent>(r#"{"type": "send", "to": "bob"}"#).is_err());
    }

    #[test]
    fn outbound_events_serialize_with_type_tags() {
        let json = serde_json::to_value(OutboundEvent::Message {
            from: "alice".into(),
            text: "hi".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "message");

        let json = serde_json::to_value(OutboundEvent::CaptureEvidence {
            message_id: 7,
            terms: vec!["idiot".into()],
            victim: "bob".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "capture_evidence");
        assert_eq!(json["message_id"], 7);

        let json = serde_json::to_value(OutboundEvent::bot_info("hello")).unwrap();
        assert_eq!(json["type"], "bot_info");
    }
}
