//! Error types for the protocol layer.
//!
//! Every variant here describes a datagram (or payload) that could not be
//! turned into a [`Frame`](crate::Frame). None of them are fatal on their
//! own: the session engine logs the error and drops the datagram.

use crate::HEADER_LEN;

/// Errors that can occur while encoding or decoding Rewind frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The buffer is shorter than the fixed 18-byte header.
    #[error("datagram too short: {len} bytes, header needs {}", HEADER_LEN)]
    TooShort { len: usize },

    /// The buffer does not start with the `REWIND01` signature.
    #[error("missing protocol signature")]
    BadSignature,

    /// The header declares more payload bytes than the datagram carries.
    #[error("payload truncated: header declares {declared} bytes, {available} available")]
    Truncated { declared: usize, available: usize },

    /// A frame handed to the encoder has a payload that won't fit in
    /// one receive buffer on the other side.
    #[error("payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    /// A typed payload (subscription, super header, ...) is shorter than
    /// its fixed layout.
    #[error("{kind} payload needs {expected} bytes, got {actual}")]
    InvalidPayload {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },
}
