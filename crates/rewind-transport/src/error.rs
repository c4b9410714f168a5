/// Errors that can occur in the transport layer.
///
/// All of these are fatal for the session: a connected UDP socket only
/// reports errors for local failures (socket closed, ICMP unreachable
/// surfaced on the next read), and the client has no retry policy.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Resolving the server host failed.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The server host resolved to no addresses.
    #[error("no address found for {0}")]
    NoAddress(String),

    /// Binding or connecting the socket failed.
    #[error("connect failed: {0}")]
    ConnectFailed(#[source] std::io::Error),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}
