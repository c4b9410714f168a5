//! Session types: the one logical connection to one relay server.
//!
//! A session tracks:
//! - WHAT the client asked for (`SessionConfig`: talkgroup, app ID, secret)
//! - WHERE the handshake stands (`SessionState`)
//!
//! Timestamps live in [`SessionTimer`](rewind_timer::SessionTimer), owned
//! next to the session by the engine.

use std::fmt;

use rewind_protocol::{SERVICE_SIMPLE_APPLICATION, VersionData};

use crate::Credentials;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Client identity and subscription target. Fixed for the session's life.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub credentials: Credentials,
    /// Application ID, sent in every keepalive.
    pub app_id: u32,
    /// Talkgroup to subscribe to.
    pub talkgroup: u32,
    /// Client description sent alongside the app ID.
    pub description: String,
}

impl SessionConfig {
    /// Default client description.
    pub const DESCRIPTION: &'static str = concat!("rewind-rx ", env!("CARGO_PKG_VERSION"));

    pub fn new(password: impl Into<String>, app_id: u32, talkgroup: u32) -> Self {
        Self {
            credentials: Credentials::new(password),
            app_id,
            talkgroup,
            description: Self::DESCRIPTION.to_string(),
        }
    }

    /// Payload of this client's keepalives.
    pub fn version_data(&self) -> VersionData {
        VersionData {
            number: self.app_id,
            service: SERVICE_SIMPLE_APPLICATION,
            description: self.description.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where the handshake stands.
///
/// ```text
///                 keepalive / configuration ack
///   Unauthenticated ─────────────────────────▶ AwaitingSubscriptionAck
///         ▲                                            │
///         │ challenge (from any state)                 │ subscription ack
///         │                                            ▼
///         └──────────────────────────────────── Authenticated
///
///   close / timeout (from any state) ──▶ Terminated
/// ```
///
/// The server drives every transition; the client never logs in on its
/// own initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A subscription request went out; waiting for the server to confirm.
    AwaitingSubscriptionAck,
    Authenticated,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("unauthenticated"),
            Self::AwaitingSubscriptionAck => f.write_str("awaiting subscription ack"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::Terminated => f.write_str("terminated"),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The single session of a client process.
///
/// Owned and mutated only by the engine loop; nothing else holds it.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    state: SessionState,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Unauthenticated,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `true` only once the server has acknowledged the subscription.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// Moves to `next`, logging the change. `Terminated` is final.
    pub(crate) fn transition(&mut self, next: SessionState) {
        if self.state == next || self.state == SessionState::Terminated {
            return;
        }
        tracing::debug!(from = %self.state, to = %next, "session state changed");
        self.state = next;
    }
}
