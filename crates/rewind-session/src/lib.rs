//! Session engine for Rewind relay clients.
//!
//! This crate owns everything between a received datagram and its effect:
//!
//! 1. **Validation**: signature and length checks, drop-and-continue on junk
//! 2. **Handshake**: subscription requests and challenge responses
//! 3. **Keepalive and timeout**: driven by [`rewind_timer::SessionTimer`]
//! 4. **Audio**: DMR frame payloads handed to an [`AudioSink`]
//!
//! # How it fits in the stack
//!
//! ```text
//! Client driver (above)  ← builds config, spawns the receiver, runs the engine
//!     ↕
//! Session Layer (this crate)  ← state machine, outbound frames
//!     ↕
//! Protocol / Transport (below)  ← wire format, UDP socket
//! ```

mod auth;
mod engine;
mod error;
mod sender;
mod session;
mod sink;

pub use auth::{Credentials, DIGEST_LEN, challenge_response};
pub use engine::{FrameOutcome, SessionEngine};
pub use error::{FatalError, FrameError};
pub use sender::FrameSender;
pub use session::{Session, SessionConfig, SessionState};
pub use sink::AudioSink;
