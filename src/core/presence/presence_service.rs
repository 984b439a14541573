// Connection registry - who is online and how to reach them.
//
// The registry owns every live session handle; transport tasks hold the
// receiving half of their session's command channel and drain it until
// told to close. At most one live session per identity: binding a new
// session for a name that is already bound displaces the old one
// (best-effort notice, then close, then overwrite).

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::core::identity::Identity;
use crate::core::relay::OutboundEvent;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Commands drained by the transport task that owns the socket.
#[derive(Debug)]
pub enum SessionCommand {
    Deliver(OutboundEvent),
    Close,
}

/// Outcome of pushing an event toward a peer.
///
/// `Delivered` means the event was queued on a live session channel; a
/// socket that dies afterwards surfaces as the session closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    PeerAbsent,
    SendFailed,
}

/// Handle to one live session. Cloneable; all clones share the session id
/// and command channel.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: u64,
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    /// Allocate a fresh session and return the command receiver for the
    /// transport task to drain.
    pub fn create() -> (Self, mpsc::UnboundedReceiver<SessionCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = Self {
            session_id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            tx,
        };
        (handle, rx)
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Queue an event for delivery. Best-effort: a closed channel reports
    /// `SendFailed` instead of erroring.
    pub fn send(&self, event: OutboundEvent) -> SendOutcome {
        if self.tx.send(SessionCommand::Deliver(event)).is_ok() {
            SendOutcome::Delivered
        } else {
            SendOutcome::SendFailed
        }
    }

    /// Ask the transport task to close the socket. Best-effort.
    pub fn close(&self) {
        let _ = self.tx.send(SessionCommand::Close);
    }
}

/// In-memory identity -> session table shared by every session task and
/// the relay engine's delivery lookups.
pub struct ConnectionRegistry {
    sessions: DashMap<Identity, SessionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Bind `session` to `identity`, displacing any previously bound
    /// session that is not the same instance. The displaced session gets a
    /// sign-out notice and a close request; both are best-effort.
    pub fn bind(&self, identity: Identity, session: SessionHandle) {
        let new_id = session.session_id();
        if let Some(previous) = self.sessions.insert(identity, session) {
            if previous.session_id() != new_id {
                let _ = previous.send(OutboundEvent::bot_info(
                    "You have been signed out due to a new login from the same username.",
                ));
                previous.close();
            }
        }
    }

    /// Remove the binding only if `session_id` still owns it. A disconnect
    /// handler racing a displacement becomes a no-op here.
    pub fn unbind(&self, identity: &Identity, session_id: u64) {
        self.sessions
            .remove_if(identity, |_, bound| bound.session_id() == session_id);
    }

    #[allow(dead_code)]
    pub fn lookup(&self, identity: &Identity) -> Option<SessionHandle> {
        self.sessions.get(identity).map(|entry| entry.clone())
    }

    /// Push an event to whoever is bound to `identity` right now.
    pub fn deliver(&self, identity: &Identity, event: OutboundEvent) -> SendOutcome {
        match self.sessions.get(identity) {
            Some(session) => session.send(event),
            None => SendOutcome::PeerAbsent,
        }
    }

    /// Sorted list of currently bound identities.
    pub fn list_active(&self) -> Vec<String> {
        let mut active: Vec<String> = self
            .sessions
            .iter()
            .map(|entry| entry.key().to_string())
            .collect();
        active.sort();
        active
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
