// Relay engine - core business logic for message delivery and abuse
// escalation.
//
// Per inbound message: block check -> persist -> deliver/echo -> detect ->
// escalate -> (maybe) block -> record incident -> notify victim.
//
// NO transport dependencies here - sessions are reached only through
// handles and the connection registry.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use super::relay_models::{BlockedEntry, Incident, OutboundEvent, StoreError};
use crate::core::detection::detect_abuse;
use crate::core::escalation::{assess, EscalationSettings, Sensitivity, Severity};
use crate::core::identity::Identity;
use crate::core::presence::{ConnectionRegistry, SendOutcome, SessionHandle};

// ============================================================================
// STORAGE TRAITS (PORTS)
// ============================================================================

/// Durable message log. Every inbound send lands here exactly once,
/// whatever happens to it afterwards - it is the audit trail root.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist one message and return its id.
    async fn insert(
        &self,
        sender: &Identity,
        receiver: &Identity,
        content: &str,
    ) -> Result<i64, StoreError>;
}

/// Append-only log of detected offenses.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    async fn record(
        &self,
        message_id: i64,
        sender: &Identity,
        victim: &Identity,
        detected_words: &[String],
        severity: Severity,
    ) -> Result<i64, StoreError>;

    /// Prior incidents for the exact sender -> victim direction.
    async fn count_for_pair(&self, sender: &Identity, victim: &Identity)
        -> Result<u32, StoreError>;

    /// Attach an evidence path to the most recently recorded incident for
    /// `message_id`. Missing incident is a no-op: evidence upload is
    /// best-effort and may race incident creation.
    async fn attach_screenshot(&self, message_id: i64, path: &str) -> Result<(), StoreError>;

    async fn list_recent(&self, limit: u32) -> Result<Vec<Incident>, StoreError>;
}

/// Durable victim -> offender block relationships. The sole authority for
/// delivery suppression.
#[async_trait]
pub trait BlockStore: Send + Sync {
    /// Idempotent: create or reset to blocked.
    async fn block(&self, victim: &Identity, offender: &Identity) -> Result<(), StoreError>;

    /// Idempotent: no-op if absent.
    async fn unblock(&self, victim: &Identity, offender: &Identity) -> Result<(), StoreError>;

    async fn is_blocked(&self, victim: &Identity, offender: &Identity)
        -> Result<bool, StoreError>;

    async fn list_blocked(&self, victim: &Identity) -> Result<Vec<BlockedEntry>, StoreError>;
}

/// Per-victim escalation configuration.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read-only lookup; `None` means the caller falls back to defaults.
    /// Never writes.
    async fn get(&self, victim: &Identity) -> Result<Option<EscalationSettings>, StoreError>;

    /// Explicit configuration change; returns the stored settings.
    async fn upsert(
        &self,
        victim: &Identity,
        sensitivity: Sensitivity,
    ) -> Result<EscalationSettings, StoreError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Relay engine orchestrating delivery, detection, and escalation.
pub struct RelayService<M, I, B, S> {
    messages: M,
    incidents: I,
    blocks: B,
    settings: S,
    registry: Arc<ConnectionRegistry>,
    // One lock per (sender, victim) pair so concurrent offenses cannot both
    // read the same prior count and skip past the block threshold.
    pair_locks: DashMap<(Identity, Identity), Arc<Mutex<()>>>,
}

impl<M, I, B, S> RelayService<M, I, B, S>
where
    M: MessageStore,
    I: IncidentStore,
    B: BlockStore,
    S: SettingsStore,
{
    pub fn new(
        messages: M,
        incidents: I,
        blocks: B,
        settings: S,
        registry: Arc<ConnectionRegistry>,
    ) -> Self {
        Self {
            messages,
            incidents,
            blocks,
            settings,
            registry,
            pair_locks: DashMap::new(),
        }
    }

    fn pair_lock(&self, sender: &Identity, victim: &Identity) -> Arc<Mutex<()>> {
        self.pair_locks
            .entry((sender.clone(), victim.clone()))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Process one inbound message from `sender`'s session.
    ///
    /// Returns `Err` only on persistence failure; delivery and notification
    /// problems are logged and never abort records already written.
    pub async fn handle_message(
        &self,
        sender: &Identity,
        sender_session: &SessionHandle,
        to: &str,
        text: &str,
    ) -> Result<(), StoreError> {
        let receiver = Identity::normalize(to);
        if receiver.is_empty() || text.trim().is_empty() {
            let _ = sender_session.send(OutboundEvent::bot_info(
                "A recipient and message text are required.",
            ));
            return Ok(());
        }

        // A blocked sender's message is stored for audit but goes no
        // further: no delivery, no detection, no escalation.
        if self.blocks.is_blocked(&receiver, sender).await? {
            self.messages.insert(sender, &receiver, text).await?;
            let _ = sender_session.send(OutboundEvent::bot(format!(
                "Your message was not delivered. You are blocked by {receiver}."
            )));
            return Ok(());
        }

        let message_id = self.messages.insert(sender, &receiver, text).await?;

        let forwarded = self.registry.deliver(
            &receiver,
            OutboundEvent::Message {
                from: sender.to_string(),
                text: text.to_string(),
            },
        );
        match forwarded {
            SendOutcome::Delivered => {}
            SendOutcome::PeerAbsent => {
                let _ = sender_session.send(OutboundEvent::bot_info(format!(
                    "Peer '{receiver}' is not connected right now."
                )));
            }
            SendOutcome::SendFailed => {
                tracing::warn!(receiver = %receiver, message_id, "forwarding to receiver session failed");
                let _ = sender_session.send(OutboundEvent::bot_info(format!(
                    "Peer '{receiver}' is not connected right now."
                )));
            }
        }

        // Echo to the sender's own client so it reflects what was sent.
        if sender_session.send(OutboundEvent::Message {
            from: sender.to_string(),
            text: text.to_string(),
        }) == SendOutcome::SendFailed
        {
            tracing::warn!(sender = %sender, message_id, "echo to sender session failed");
        }

        let (abusive, terms) = detect_abuse(text);
        if !abusive {
            return Ok(());
        }

        // Side channel: the sender's client captures the evidence and
        // reports back out-of-band.
        let _ = sender_session.send(OutboundEvent::CaptureEvidence {
            message_id,
            terms: terms.clone(),
            victim: receiver.to_string(),
        });

        // Serialize count -> notify -> block -> record for this pair.
        let lock = self.pair_lock(sender, &receiver);
        let _guard = lock.lock().await;

        let settings = self.settings.get(&receiver).await?.unwrap_or_default();
        let offense_count = self.incidents.count_for_pair(sender, &receiver).await? + 1;
        let severity = assess(offense_count, &settings);

        match severity {
            Severity::Warning => {
                let _ = sender_session.send(OutboundEvent::bot(format!(
                    "\u{26a0}\u{fe0f} Warning: You used abusive word(s) {} against {}.",
                    terms.join(", "),
                    receiver
                )));
            }
            Severity::FinalWarning => {
                let _ = sender_session.send(OutboundEvent::bot(format!(
                    "\u{26a0}\u{fe0f} Final Warning: You used abusive word(s) {} against {}. Next offense will trigger blocking.",
                    terms.join(", "),
                    receiver
                )));
            }
            Severity::Blocked => {
                self.blocks.block(&receiver, sender).await?;
                let _ = sender_session.send(OutboundEvent::bot(format!(
                    "\u{1f6ab} You have been blocked by {receiver} due to repeated abusive messages. An incident report has been prepared."
                )));
            }
        }

        self.incidents
            .record(message_id, sender, &receiver, &terms, severity)
            .await?;

        // Private notice to the victim only; severity is all it reveals.
        let notice = OutboundEvent::bot_info(format!(
            "Abusive language detected from {sender}. Severity: {severity}."
        ));
        if self.registry.deliver(&receiver, notice) == SendOutcome::SendFailed {
            tracing::warn!(victim = %receiver, message_id, "abuse notice to victim failed");
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
