//! UDP transport implementation using `tokio::net::UdpSocket`.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use crate::{Connection, TransportError};

/// A UDP socket connected to a single relay server.
///
/// Connecting the socket makes the kernel filter out datagrams from any
/// other source, so everything `recv` returns came from the server.
#[derive(Debug)]
pub struct UdpConnection {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpConnection {
    /// Resolves `host:port`, binds an ephemeral local port of the same
    /// address family, and connects to the first resolved address.
    pub async fn connect(host: &str, port: u16) -> Result<Self, TransportError> {
        let peer = tokio::net::lookup_host((host, port))
            .await
            .map_err(|source| TransportError::Resolve {
                host: host.to_string(),
                source,
            })?
            .next()
            .ok_or_else(|| TransportError::NoAddress(format!("{host}:{port}")))?;

        Self::connect_addr(peer).await
    }

    /// Connects to an already-resolved address.
    pub async fn connect_addr(peer: SocketAddr) -> Result<Self, TransportError> {
        let local: SocketAddr = if peer.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local)
            .await
            .map_err(TransportError::ConnectFailed)?;
        socket
            .connect(peer)
            .await
            .map_err(TransportError::ConnectFailed)?;

        tracing::info!(%peer, local = ?socket.local_addr().ok(), "UDP socket connected");
        Ok(Self { socket, peer })
    }

    /// The local address the socket is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Connection for UdpConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        tracing::trace!(peer = %self.peer, bytes = data.len(), "sending datagram");
        self.socket
            .send(data)
            .await
            .map(|_| ())
            .map_err(TransportError::SendFailed)
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.socket
            .recv(buf)
            .await
            .map_err(TransportError::ReceiveFailed)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}
