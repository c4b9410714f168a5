//! `RewindClient`: connects, starts the receiver, and runs the session.
//!
//! This is the entry point for running a client. It ties together all
//! the layers: config → transport → session.

use std::future::Future;
use std::sync::Arc;

use rewind_protocol::MAX_DATAGRAM_LEN;
use rewind_session::{AudioSink, FatalError, SessionEngine};
use rewind_transport::{Connection, ReceiverConfig, UdpConnection, spawn_receiver};

use crate::{ClientConfig, RewindError};

/// A client for one relay server and one talkgroup.
///
/// # Example
///
/// ```rust,no_run
/// use rewind::prelude::*;
///
/// # async fn example() -> Result<(), RewindError> {
/// let config = ClientConfig::load("config.json")?;
/// RewindClient::new(config)
///     .run(std::io::stdout(), async {
///         let _ = tokio::signal::ctrl_c().await;
///     })
///     .await
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RewindClient {
    config: ClientConfig,
}

impl RewindClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Runs one session to completion, writing audio to `sink`.
    ///
    /// Returns `Ok(())` once `shutdown` resolves (after a best-effort
    /// Close) or when the sink reports a broken pipe. Everything else
    /// that ends the session is an error. There is no reconnect.
    pub async fn run<S, F>(&self, sink: S, shutdown: F) -> Result<(), RewindError>
    where
        S: AudioSink,
        F: Future<Output = ()>,
    {
        let conn = Arc::new(
            UdpConnection::connect(&self.config.server_host, self.config.server_port).await?,
        );
        tracing::info!(
            peer = %conn.peer_addr(),
            talkgroup = self.config.talkgroup,
            app_id = self.config.app_id,
            "connected to relay server"
        );

        let (datagrams, receiver) = spawn_receiver(
            Arc::clone(&conn),
            ReceiverConfig {
                buffer_len: MAX_DATAGRAM_LEN,
                ..ReceiverConfig::default()
            },
        );

        let mut engine = SessionEngine::new(
            self.config.session_config(),
            self.config.timer_config(),
            conn,
            sink,
        );

        match engine.run(datagrams, shutdown).await {
            Ok(()) => {
                receiver.abort();
                Ok(())
            }
            // The queue only closes when the receiver ends; report why.
            Err(FatalError::ReceiverStopped) => match receiver.await {
                Ok(Err(e)) => Err(e.into()),
                _ => Err(FatalError::ReceiverStopped.into()),
            },
            Err(e) => {
                receiver.abort();
                Err(e.into())
            }
        }
    }
}
