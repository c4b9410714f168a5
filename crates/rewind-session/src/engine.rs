//! The session engine: validation, dispatch, and the main loop.
//!
//! Each iteration of [`SessionEngine::run`]:
//!   1. Send a keepalive if one is due
//!   2. Wait for a datagram, the poll interval, or shutdown
//!   3. Validate and dispatch the datagram, if one arrived
//!   4. Check the session timeout
//!
//! Everything below the loop ([`handle_datagram`](SessionEngine::handle_datagram),
//! [`poll_keepalive`](SessionEngine::poll_keepalive),
//! [`check_timeout`](SessionEngine::check_timeout)) is usable on its own,
//! which is how the tests drive the state machine step by step.

use std::future::Future;
use std::io;
use std::sync::Arc;

use rewind_protocol::{
    ConfigurationData, Frame, PacketType, SessionType, SuperHeader, decode, failure_code,
    has_signature,
};
use rewind_timer::{SessionTimer, TimerConfig};
use rewind_transport::{Connection, Datagram};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::{AudioSink, FatalError, FrameError, FrameSender, Session, SessionConfig, SessionState};

/// What became of one datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Valid frame, handled. Resets the session timeout.
    Accepted(PacketType),
    /// Dropped without a state change. Does not count as traffic.
    Dropped(FrameError),
}

impl FrameOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Drives one session against one connection, feeding audio to `S`.
pub struct SessionEngine<C: Connection, S: AudioSink> {
    session: Session,
    timer: SessionTimer,
    sender: FrameSender<C>,
    sink: S,
}

impl<C: Connection, S: AudioSink> SessionEngine<C, S> {
    /// Creates an engine. The timeout clock starts now.
    pub fn new(config: SessionConfig, timer: TimerConfig, conn: Arc<C>, sink: S) -> Self {
        Self {
            session: Session::new(config),
            timer: SessionTimer::new(timer),
            sender: FrameSender::new(conn),
            sink,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    // -----------------------------------------------------------------------
    // Main loop
    // -----------------------------------------------------------------------

    /// Runs the session until it ends.
    ///
    /// Returns `Ok(())` when `shutdown` resolves or the audio consumer goes
    /// away; in both cases a Close frame is sent first (best effort). Every
    /// other way out is a [`FatalError`].
    pub async fn run<F>(
        &mut self,
        mut datagrams: mpsc::Receiver<Datagram>,
        shutdown: F,
    ) -> Result<(), FatalError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        tracing::info!(talkgroup = self.session.config().talkgroup, "starting listening loop");

        loop {
            self.poll_keepalive().await?;

            tokio::select! {
                biased;

                () = &mut shutdown => {
                    tracing::info!("shutdown requested, closing session");
                    self.close().await;
                    return Ok(());
                }

                received = datagrams.recv() => {
                    let Some(datagram) = received else {
                        self.session.transition(SessionState::Terminated);
                        return Err(FatalError::ReceiverStopped);
                    };
                    match self.handle_datagram(datagram.as_bytes()).await {
                        Ok(_) => {}
                        Err(FatalError::SinkClosed) => {
                            tracing::info!("audio consumer went away, closing session");
                            self.close().await;
                            return Ok(());
                        }
                        Err(e) => return Err(e),
                    }
                }

                () = tokio::time::sleep(self.timer.poll_interval()) => {}
            }

            self.check_timeout()?;
        }
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    /// Sends a keepalive if the keepalive interval has passed. Runs in
    /// every state. Returns whether one was sent.
    pub async fn poll_keepalive(&mut self) -> Result<bool, FatalError> {
        let now = Instant::now();
        if !self.timer.keepalive_due(now) {
            return Ok(false);
        }
        let version = self.session.config().version_data();
        self.sender.send_keepalive(&version).await?;
        self.timer.record_keepalive(now);
        Ok(true)
    }

    /// Fails with [`FatalError::Timeout`] once the session has been silent
    /// for the configured timeout.
    pub fn check_timeout(&mut self) -> Result<(), FatalError> {
        match self.timer.check_timeout(Instant::now()) {
            Some(silence) => {
                self.session.transition(SessionState::Terminated);
                Err(FatalError::Timeout(silence))
            }
            None => Ok(()),
        }
    }

    /// Sends a Close frame and terminates the session. Send errors are
    /// logged and otherwise ignored.
    pub async fn close(&mut self) {
        if let Err(e) = self.sender.send_close().await {
            tracing::warn!(error = %e, "failed to send close");
        }
        self.session.transition(SessionState::Terminated);
    }

    // -----------------------------------------------------------------------
    // Validation and dispatch
    // -----------------------------------------------------------------------

    /// Validates one datagram and runs the handler for its packet type.
    ///
    /// Only [`FrameOutcome::Accepted`] resets the timeout clock.
    pub async fn handle_datagram(&mut self, datagram: &[u8]) -> Result<FrameOutcome, FatalError> {
        if self.session.is_terminated() {
            return Ok(FrameOutcome::Dropped(FrameError::Terminated));
        }

        if !has_signature(datagram) {
            tracing::trace!(len = datagram.len(), "dropping unsigned datagram");
            return Ok(FrameOutcome::Dropped(FrameError::BadSignature));
        }

        let frame = match decode(datagram) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "invalid payload length, dropping packet");
                return Ok(FrameOutcome::Dropped(FrameError::Malformed(e)));
            }
        };

        let outcome = self.dispatch(frame).await?;
        match &outcome {
            FrameOutcome::Accepted(_) => self.timer.record_valid_frame(Instant::now()),
            FrameOutcome::Dropped(e) => tracing::debug!(error = %e, "dropping packet"),
        }
        Ok(outcome)
    }

    async fn dispatch(&mut self, frame: Frame) -> Result<FrameOutcome, FatalError> {
        let Frame {
            packet_type,
            payload,
            ..
        } = frame;

        match packet_type {
            PacketType::KeepAlive => {
                if !self.session.is_authenticated() {
                    self.request_subscription().await?;
                }
            }

            PacketType::Configuration => {
                match ConfigurationData::from_bytes(&payload) {
                    Ok(cfg) => tracing::info!(
                        options = cfg.options,
                        super_headers = cfg.super_headers(),
                        linear_frames = cfg.linear_frames(),
                        "got configuration ack"
                    ),
                    Err(_) => tracing::info!("got configuration ack"),
                }
                if !self.session.is_authenticated() {
                    self.request_subscription().await?;
                }
            }

            // An ack only counts as the answer to a request we sent; a stray
            // one must not log the client in before any subscription went out.
            PacketType::Subscription => {
                tracing::info!("got subscription ack");
                if self.session.state() == SessionState::AwaitingSubscriptionAck {
                    self.session.transition(SessionState::Authenticated);
                    tracing::info!(talkgroup = self.session.config().talkgroup, "logged in");
                } else {
                    tracing::debug!(state = %self.session.state(), "subscription ack not expected, ignoring");
                }
            }

            PacketType::Challenge => {
                tracing::info!("got challenge");
                self.session.transition(SessionState::Unauthenticated);
                let digest = self.session.config().credentials.respond(&payload);
                tracing::debug!(
                    challenge = %hex::encode(&payload),
                    digest = %hex::encode(digest),
                    "sending challenge response"
                );
                self.sender.send_challenge_response(&digest).await?;
            }

            PacketType::Report => {
                let text = String::from_utf8_lossy(&payload);
                tracing::info!(report = %text.trim_end_matches('\0').trim(), "server report");
            }

            PacketType::FailureCode => match failure_code(&payload) {
                Some(code) => tracing::warn!(code, "got failure code"),
                None => tracing::warn!(payload = %hex::encode(&payload), "got failure code"),
            },

            PacketType::SuperHeader => match SuperHeader::from_bytes(&payload) {
                Ok(header) => tracing::info!(
                    session_type = %header.session_type,
                    source_id = header.source_id,
                    source_call = %header.source_call,
                    destination_id = header.destination_id,
                    destination_call = %header.destination_call,
                    "call started"
                ),
                Err(source) => {
                    return Ok(FrameOutcome::Dropped(FrameError::MalformedPayload {
                        packet_type,
                        source,
                    }));
                }
            },

            PacketType::DmrAudioFrame => {
                self.sink.write_frame(&payload).map_err(|e| {
                    if e.kind() == io::ErrorKind::BrokenPipe {
                        FatalError::SinkClosed
                    } else {
                        FatalError::Sink(e)
                    }
                })?;
            }

            PacketType::Close => {
                tracing::info!("got close request");
                self.session.transition(SessionState::Terminated);
                return Err(FatalError::ServerClosed);
            }

            PacketType::ChallengeResponse | PacketType::Unknown(_) => {
                return Ok(FrameOutcome::Dropped(FrameError::UnhandledPacketType(packet_type)));
            }
        }

        Ok(FrameOutcome::Accepted(packet_type))
    }

    async fn request_subscription(&mut self) -> Result<(), FatalError> {
        let talkgroup = self.session.config().talkgroup;
        tracing::debug!(talkgroup, "requesting subscription");
        self.sender
            .send_subscription(talkgroup, SessionType::GroupVoice)
            .await?;
        if self.session.state() == SessionState::Unauthenticated {
            self.session.transition(SessionState::AwaitingSubscriptionAck);
        }
        Ok(())
    }
}
