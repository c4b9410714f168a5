//! The frame sender: builds control frames and puts them on the wire.
//!
//! Sends are fire-and-forget. UDP gives no delivery feedback, so the only
//! errors seen here are local ones, and those end the session.

use std::sync::Arc;

use rewind_protocol::{Frame, PacketType, SessionType, SubscriptionData, VersionData, encode};
use rewind_transport::Connection;

use crate::FatalError;

/// Outbound half of the session, with its own sequence counter.
pub struct FrameSender<C: Connection> {
    conn: Arc<C>,
    sequence: u32,
}

impl<C: Connection> FrameSender<C> {
    pub fn new(conn: Arc<C>) -> Self {
        Self { conn, sequence: 0 }
    }

    /// Sends a keepalive carrying the client's version data.
    pub async fn send_keepalive(&mut self, version: &VersionData) -> Result<(), FatalError> {
        self.send(PacketType::KeepAlive, &version.to_bytes()).await
    }

    /// Asks the server to stream `talkgroup`.
    pub async fn send_subscription(
        &mut self,
        talkgroup: u32,
        session_type: SessionType,
    ) -> Result<(), FatalError> {
        let data = SubscriptionData {
            session_type,
            number: talkgroup,
        };
        self.send(PacketType::Subscription, &data.to_bytes()).await
    }

    /// Answers a challenge with its digest.
    pub async fn send_challenge_response(&mut self, digest: &[u8]) -> Result<(), FatalError> {
        self.send(PacketType::ChallengeResponse, digest).await
    }

    /// Tells the server the client is leaving.
    pub async fn send_close(&mut self) -> Result<(), FatalError> {
        self.send(PacketType::Close, &[]).await
    }

    /// Encodes and sends one frame with the next sequence number.
    pub async fn send(&mut self, packet_type: PacketType, payload: &[u8]) -> Result<(), FatalError> {
        let frame = Frame::new(packet_type, payload).with_sequence(self.next_sequence());
        let bytes = encode(&frame).map_err(FatalError::Encode)?;
        self.conn.send(&bytes).await?;
        tracing::trace!(%packet_type, sequence = frame.sequence, "frame sent");
        Ok(())
    }

    /// Sequence number the next frame will carry.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    fn next_sequence(&mut self) -> u32 {
        let current = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        current
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Mutex;

    use rewind_protocol::decode;
    use rewind_transport::TransportError;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<Vec<u8>>>);

    impl Connection for Recorder {
        async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
            self.0.lock().unwrap().push(data.to_vec());
            Ok(())
        }

        async fn recv(&self, _buf: &mut [u8]) -> Result<usize, TransportError> {
            std::future::pending().await
        }

        fn peer_addr(&self) -> SocketAddr {
            "127.0.0.1:54005".parse().unwrap()
        }
    }

    fn last_sequence(conn: &Recorder) -> u32 {
        let sent = conn.0.lock().unwrap();
        decode(sent.last().unwrap()).unwrap().sequence
    }

    #[tokio::test]
    async fn test_sequence_advances_per_frame() {
        let conn = Arc::new(Recorder::default());
        let mut sender = FrameSender::new(Arc::clone(&conn));
        assert_eq!(sender.sequence(), 0);

        sender.send_close().await.unwrap();
        assert_eq!(last_sequence(&conn), 0);
        sender.send_challenge_response(&[0; 32]).await.unwrap();
        assert_eq!(last_sequence(&conn), 1);
        assert_eq!(sender.sequence(), 2);
    }

    #[tokio::test]
    async fn test_sequence_wraps() {
        let conn = Arc::new(Recorder::default());
        let mut sender = FrameSender::new(Arc::clone(&conn));
        sender.sequence = u32::MAX;

        sender.send_close().await.unwrap();
        assert_eq!(last_sequence(&conn), u32::MAX);
        assert_eq!(sender.sequence(), 0);
    }
}
