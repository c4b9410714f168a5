//! Integration tests for the UDP connection and the receiver task.
//!
//! These use real sockets on the loopback interface. The "server" side is
//! a plain `tokio::net::UdpSocket` bound to port 0 so the OS picks a free
//! port for every test.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rewind_transport::{
    Connection, Datagram, ReceiverConfig, TransportError, UdpConnection, spawn_receiver,
};
use tokio::net::UdpSocket;

async fn server() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.expect("should bind");
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

#[tokio::test]
async fn test_connect_send_and_receive() {
    let (server, addr) = server().await;
    let conn = UdpConnection::connect("127.0.0.1", addr.port())
        .await
        .expect("should connect");
    assert_eq!(conn.peer_addr(), addr);

    // Client → server.
    conn.send(b"hello from client").await.unwrap();
    let mut buf = [0u8; 64];
    let (n, from) = server.recv_from(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"hello from client");
    assert_eq!(from, conn.local_addr().unwrap());

    // Server → client.
    server.send_to(b"hello from server", from).await.unwrap();
    let n = conn.recv(&mut buf).await.unwrap();
    assert_eq!(&buf[..n], b"hello from server");
}

#[tokio::test]
async fn test_receiver_publishes_in_order() {
    let (server, addr) = server().await;
    let conn = Arc::new(UdpConnection::connect_addr(addr).await.unwrap());
    let client = conn.local_addr().unwrap();

    let (mut rx, _handle) = spawn_receiver(Arc::clone(&conn), ReceiverConfig::default());

    for i in 0u8..10 {
        server.send_to(&[i, i, i], client).await.unwrap();
    }
    for i in 0u8..10 {
        let d = rx.recv().await.expect("queue open");
        assert_eq!(d, Datagram::new(vec![i, i, i]));
    }
}

#[tokio::test]
async fn test_receiver_truncates_to_buffer_len() {
    let (server, addr) = server().await;
    let conn = Arc::new(UdpConnection::connect_addr(addr).await.unwrap());
    let client = conn.local_addr().unwrap();

    let (mut rx, _handle) = spawn_receiver(conn, ReceiverConfig::default());

    let big: Vec<u8> = (0..200).map(|i| i as u8).collect();
    server.send_to(&big, client).await.unwrap();

    let d = rx.recv().await.unwrap();
    assert_eq!(d.len(), 128);
    assert_eq!(d.as_bytes(), &big[..128]);
}

#[tokio::test]
async fn test_receiver_stops_when_queue_dropped() {
    let (server, addr) = server().await;
    let conn = Arc::new(UdpConnection::connect_addr(addr).await.unwrap());
    let client = conn.local_addr().unwrap();

    let (rx, handle) = spawn_receiver(conn, ReceiverConfig::default());
    drop(rx);

    // The receiver notices on its next publish.
    server.send_to(b"anyone?", client).await.unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("receiver should stop")
        .expect("task should not panic");
    assert!(result.is_ok());
}

/// A connection whose reads fail after a fixed number of datagrams.
struct FlakyConnection {
    good_reads: usize,
    reads: AtomicUsize,
}

impl Connection for FlakyConnection {
    async fn send(&self, _data: &[u8]) -> Result<(), TransportError> {
        Ok(())
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let n = self.reads.fetch_add(1, Ordering::SeqCst);
        if n < self.good_reads {
            buf[0] = n as u8;
            Ok(1)
        } else {
            Err(TransportError::ReceiveFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "port unreachable",
            )))
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        "127.0.0.1:54005".parse().unwrap()
    }
}

#[tokio::test]
async fn test_receiver_read_error_closes_queue() {
    let conn = Arc::new(FlakyConnection {
        good_reads: 2,
        reads: AtomicUsize::new(0),
    });
    let (mut rx, handle) = spawn_receiver(conn, ReceiverConfig::default());

    assert_eq!(rx.recv().await.unwrap().as_bytes(), &[0]);
    assert_eq!(rx.recv().await.unwrap().as_bytes(), &[1]);
    assert!(rx.recv().await.is_none(), "queue should close after the error");

    let result = handle.await.unwrap();
    assert!(matches!(result, Err(TransportError::ReceiveFailed(_))));
}
