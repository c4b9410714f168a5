//! The frame receiver: a task that does nothing but read datagrams.
//!
//! Reading runs in its own task so the session engine never blocks on
//! the socket; the engine waits on the queue with a timeout instead and
//! keeps its timers running when the server goes quiet.
//!
//! ```text
//!  socket ──recv──▶ receiver task ──mpsc (bounded, ordered)──▶ engine
//! ```
//!
//! The receiver never looks inside a datagram. It has no retry policy:
//! the first read error ends the task, which closes the queue.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{Connection, Datagram, TransportError};

/// Bytes read per datagram. Longer datagrams are truncated.
pub const DEFAULT_BUFFER_LEN: usize = 128;

/// Datagrams buffered between the receiver and the engine.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Sizing for [`spawn_receiver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverConfig {
    pub buffer_len: usize,
    pub queue_capacity: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            buffer_len: DEFAULT_BUFFER_LEN,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Spawns the receiver task for `conn`.
///
/// Returns the consuming end of the datagram queue and the task handle.
/// The task resolves to:
/// - `Err(e)` after the first read error (the queue closes with it);
/// - `Ok(())` if the consumer dropped the queue.
pub fn spawn_receiver<C: Connection>(
    conn: Arc<C>,
    config: ReceiverConfig,
) -> (mpsc::Receiver<Datagram>, JoinHandle<Result<(), TransportError>>) {
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));
    let handle = tokio::spawn(receive_loop(conn, tx, config.buffer_len));
    (rx, handle)
}

async fn receive_loop<C: Connection>(
    conn: Arc<C>,
    tx: mpsc::Sender<Datagram>,
    buffer_len: usize,
) -> Result<(), TransportError> {
    let peer = conn.peer_addr();
    tracing::debug!(%peer, buffer_len, "receiver started");

    let mut buf = vec![0u8; buffer_len];
    loop {
        let n = match conn.recv(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(%peer, error = %e, "receive failed, stopping receiver");
                return Err(e);
            }
        };

        if tx.send(Datagram::new(&buf[..n])).await.is_err() {
            tracing::debug!(%peer, "datagram queue closed, stopping receiver");
            return Ok(());
        }
    }
}
