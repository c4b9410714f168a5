//! Unified error type for the Rewind client.

use rewind_session::FatalError;
use rewind_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// Every variant ends the client. Per-datagram problems never get this
/// far; the session engine drops those itself.
#[derive(Debug, thiserror::Error)]
pub enum RewindError {
    /// The configuration file could not be read or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The socket could not be set up, or failed while reading.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The session ended (timeout, server close, send failure, ...).
    #[error(transparent)]
    Fatal(#[from] FatalError),
}
