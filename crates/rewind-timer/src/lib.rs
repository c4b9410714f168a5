//! Keepalive and session-timeout deadlines for rewind-rx.
//!
//! A Rewind session runs on two independent clocks:
//!
//! - **Keepalive send deadline**: the client sends a keepalive whenever
//!   [`TimerConfig::keepalive_interval`] has passed since the last one,
//!   whatever the session state. The first keepalive is due immediately;
//!   it is what makes a silent server start talking.
//! - **Session timeout deadline**: if nothing valid has arrived for
//!   [`TimerConfig::session_timeout`], the session is dead.
//!
//! [`SessionTimer`] only does the bookkeeping. It never sleeps on its own;
//! the engine loop checks it once per iteration, and each iteration waits
//! at most [`TimerConfig::poll_interval`] for an inbound datagram.
//!
//! # Integration
//!
//! ```ignore
//! loop {
//!     if timer.keepalive_due(Instant::now()) {
//!         sender.send_keepalive().await?;
//!         timer.record_keepalive(Instant::now());
//!     }
//!     tokio::select! {
//!         Some(d) = rx.recv() => { /* decode, dispatch, maybe record_valid_frame */ }
//!         _ = tokio::time::sleep(timer.poll_interval()) => {}
//!     }
//!     if let Some(silence) = timer.check_timeout(Instant::now()) {
//!         return Err(/* timeout */);
//!     }
//! }
//! ```
//!
//! All instants are [`tokio::time::Instant`], so tests can drive the timer
//! with a paused runtime clock.

use std::time::Duration;

use rewind_protocol::KEEPALIVE_INTERVAL_SECS;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Intervals for the session timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Time between keepalives. Default: 5 s.
    pub keepalive_interval: Duration,
    /// Longest the engine waits for a datagram before re-checking the
    /// deadlines. Default: 5 s.
    pub poll_interval: Duration,
    /// Silence after which the session is considered dead. Default: 30 s.
    pub session_timeout: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            keepalive_interval: Self::DEFAULT_INTERVAL,
            poll_interval: Self::DEFAULT_INTERVAL,
            session_timeout: Duration::from_secs(30),
        }
    }
}

impl TimerConfig {
    /// Keepalive and poll interval used by Rewind servers.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(KEEPALIVE_INTERVAL_SECS);

    /// Default intervals with the given session timeout.
    pub fn with_timeout(session_timeout: Duration) -> Self {
        Self {
            session_timeout,
            ..Default::default()
        }
    }

    /// Replaces zero durations so the timer can't spin or expire instantly.
    ///
    /// Called automatically by [`SessionTimer::new`]. Zero intervals fall
    /// back to [`Self::DEFAULT_INTERVAL`]; a zero timeout becomes one second.
    pub fn validated(mut self) -> Self {
        if self.keepalive_interval.is_zero() {
            warn!("keepalive_interval is zero, using default");
            self.keepalive_interval = Self::DEFAULT_INTERVAL;
        }
        if self.poll_interval.is_zero() {
            warn!("poll_interval is zero, using default");
            self.poll_interval = Self::DEFAULT_INTERVAL;
        }
        if self.session_timeout.is_zero() {
            warn!("session_timeout is zero, using 1s");
            self.session_timeout = Duration::from_secs(1);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Deadline bookkeeping for one session.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    config: TimerConfig,
    /// `None` until the first keepalive goes out.
    last_keepalive: Option<Instant>,
    /// Starts at creation so a server that never answers still times out.
    last_valid_frame: Instant,
    /// Latched once the timeout has been reported.
    timed_out: bool,
    keepalives_sent: u64,
}

impl SessionTimer {
    /// Creates a timer whose receive clock starts now.
    pub fn new(config: TimerConfig) -> Self {
        Self::starting_at(config, Instant::now())
    }

    /// Creates a timer whose receive clock starts at `start`.
    pub fn starting_at(config: TimerConfig, start: Instant) -> Self {
        let config = config.validated();
        debug!(
            keepalive_s = config.keepalive_interval.as_secs_f64(),
            poll_s = config.poll_interval.as_secs_f64(),
            timeout_s = config.session_timeout.as_secs_f64(),
            "session timer created"
        );
        Self {
            config,
            last_keepalive: None,
            last_valid_frame: start,
            timed_out: false,
            keepalives_sent: 0,
        }
    }

    /// Whether a keepalive should be sent at `now`.
    pub fn keepalive_due(&self, now: Instant) -> bool {
        match self.last_keepalive {
            None => true,
            Some(sent) => now.saturating_duration_since(sent) >= self.config.keepalive_interval,
        }
    }

    /// Records that a keepalive went out at `now`.
    pub fn record_keepalive(&mut self, now: Instant) {
        self.last_keepalive = Some(now);
        self.keepalives_sent += 1;
        trace!(count = self.keepalives_sent, "keepalive recorded");
    }

    /// Records a valid inbound frame, pushing the timeout deadline out.
    pub fn record_valid_frame(&mut self, now: Instant) {
        self.last_valid_frame = now;
    }

    /// Time since the last valid frame (or since the timer started).
    pub fn silence(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_valid_frame)
    }

    /// Checks the session timeout deadline.
    ///
    /// Returns the silence duration the first time it reaches
    /// [`TimerConfig::session_timeout`], and `None` on every other call,
    /// including all calls after the timeout has fired.
    pub fn check_timeout(&mut self, now: Instant) -> Option<Duration> {
        if self.timed_out {
            return None;
        }
        let silence = self.silence(now);
        if silence < self.config.session_timeout {
            return None;
        }
        self.timed_out = true;
        warn!(
            silence_s = silence.as_secs_f64(),
            timeout_s = self.config.session_timeout.as_secs_f64(),
            "session timed out"
        );
        Some(silence)
    }

    /// Whether the timeout has fired.
    pub fn is_timed_out(&self) -> bool {
        self.timed_out
    }

    /// How long one engine iteration waits for a datagram.
    pub fn poll_interval(&self) -> Duration {
        self.config.poll_interval
    }

    /// Number of keepalives recorded so far.
    pub fn keepalives_sent(&self) -> u64 {
        self.keepalives_sent
    }

    /// The validated configuration in use.
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }
}
