//! Error types for the session layer.
//!
//! Errors come in exactly two tiers:
//!
//! - [`FrameError`]: something was wrong with one datagram. The engine
//!   logs it, drops the datagram, and carries on. These never leave the
//!   engine as `Err`; they are reported through
//!   [`FrameOutcome::Dropped`](crate::FrameOutcome::Dropped).
//! - [`FatalError`]: the session is over. The engine stops and the
//!   driver decides how to exit.

use std::time::Duration;

use rewind_protocol::{PacketType, ProtocolError};
use rewind_transport::TransportError;

/// A datagram the engine dropped without changing session state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    /// The datagram doesn't start with the protocol signature.
    #[error("datagram without protocol signature")]
    BadSignature,

    /// The header is short or declares more payload than was received.
    #[error("malformed frame: {0}")]
    Malformed(#[from] ProtocolError),

    /// A known packet type whose payload doesn't fit its layout.
    #[error("malformed {packet_type} payload: {source}")]
    MalformedPayload {
        packet_type: PacketType,
        source: ProtocolError,
    },

    /// A packet type the client doesn't handle.
    #[error("unhandled packet type {0}")]
    UnhandledPacketType(PacketType),

    /// The session already ended; nothing more is processed.
    #[error("session terminated")]
    Terminated,
}

/// A condition that ends the session.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
    /// No valid frame arrived within the session timeout.
    #[error("timeout, disconnected after {:.1}s without a valid frame", .0.as_secs_f64())]
    Timeout(Duration),

    /// The server sent a Close frame.
    #[error("server closed the session")]
    ServerClosed,

    /// The datagram queue closed (the receiver task ended).
    #[error("datagram receiver stopped")]
    ReceiverStopped,

    /// Sending a frame failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// One of our own frames could not be encoded.
    #[error("failed to encode frame: {0}")]
    Encode(#[source] ProtocolError),

    /// The audio consumer went away (broken pipe).
    #[error("audio consumer closed")]
    SinkClosed,

    /// Writing to the audio sink failed.
    #[error("audio sink failed: {0}")]
    Sink(#[source] std::io::Error),
}
