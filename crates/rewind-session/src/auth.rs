//! Challenge-response authentication.
//!
//! The server may challenge the client at any time, including in the
//! middle of an authenticated session. The answer is
//! `sha256(challenge ++ password)`, sent back as a
//! [`ChallengeResponse`](rewind_protocol::PacketType::ChallengeResponse)
//! frame. The challenge bytes are used once and never stored.

use std::fmt;

use sha2::{Digest, Sha256};

/// Length of a challenge response digest.
pub const DIGEST_LEN: usize = 32;

/// The shared secret for one relay server.
///
/// `Debug` output never includes the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    password: String,
}

impl Credentials {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    /// Computes the response to a server challenge.
    pub fn respond(&self, challenge: &[u8]) -> [u8; DIGEST_LEN] {
        challenge_response(challenge, &self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `sha256(challenge ++ password)`, with the password used as raw bytes.
pub fn challenge_response(challenge: &[u8], password: &str) -> [u8; DIGEST_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(challenge);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}
