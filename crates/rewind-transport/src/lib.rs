//! Transport layer for rewind-rx.
//!
//! Provides the [`Connection`] trait that the session engine sends through,
//! the [`UdpConnection`] that implements it over a connected UDP socket,
//! and the frame receiver task ([`spawn_receiver`]) that reads datagrams
//! off a connection and hands them to the engine in arrival order.

mod error;
mod receiver;
mod udp;

pub use error::TransportError;
pub use receiver::{DEFAULT_BUFFER_LEN, DEFAULT_QUEUE_CAPACITY, ReceiverConfig, spawn_receiver};
pub use udp::UdpConnection;

use std::future::Future;
use std::net::SocketAddr;

/// One datagram as read from the socket, already cut to the number of
/// bytes received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    bytes: Vec<u8>,
}

impl Datagram {
    /// Wraps received bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// A connected datagram endpoint: one remote peer, whole-datagram sends
/// and receives.
///
/// The futures are required to be `Send` so a connection can be driven
/// from a spawned task (the receiver) while the engine sends on it from
/// another.
pub trait Connection: Send + Sync + 'static {
    /// Sends one datagram to the peer.
    fn send(&self, data: &[u8]) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Receives one datagram into `buf`, returning the number of bytes
    /// written. Datagrams longer than `buf` are truncated.
    fn recv(&self, buf: &mut [u8]) -> impl Future<Output = Result<usize, TransportError>> + Send;

    /// The remote peer's address.
    fn peer_addr(&self) -> SocketAddr;
}
