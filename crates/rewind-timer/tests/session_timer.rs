//! Integration tests for the session timer.
//!
//! Uses `start_paused = true` so `Instant::now()` only moves when the test
//! calls `tokio::time::advance`.

use std::time::Duration;

use rewind_timer::{SessionTimer, TimerConfig};
use tokio::time::{Instant, advance};

// =========================================================================
// Helpers
// =========================================================================

fn timer_with_timeout(secs: u64) -> SessionTimer {
    SessionTimer::new(TimerConfig::with_timeout(Duration::from_secs(secs)))
}

// =========================================================================
// TimerConfig
// =========================================================================

#[test]
fn test_default_config() {
    let cfg = TimerConfig::default();
    assert_eq!(cfg.keepalive_interval, Duration::from_secs(5));
    assert_eq!(cfg.poll_interval, Duration::from_secs(5));
    assert_eq!(cfg.session_timeout, Duration::from_secs(30));
}

#[test]
fn test_default_interval_follows_protocol() {
    assert_eq!(
        TimerConfig::DEFAULT_INTERVAL,
        Duration::from_secs(rewind_protocol::KEEPALIVE_INTERVAL_SECS)
    );
}

#[test]
fn test_validated_replaces_zero_durations() {
    let cfg = TimerConfig {
        keepalive_interval: Duration::ZERO,
        poll_interval: Duration::ZERO,
        session_timeout: Duration::ZERO,
    }
    .validated();
    assert_eq!(cfg.keepalive_interval, TimerConfig::DEFAULT_INTERVAL);
    assert_eq!(cfg.poll_interval, TimerConfig::DEFAULT_INTERVAL);
    assert_eq!(cfg.session_timeout, Duration::from_secs(1));
}

#[test]
fn test_validated_keeps_sane_values() {
    let cfg = TimerConfig::with_timeout(Duration::from_secs(12));
    assert_eq!(cfg.validated(), cfg);
}

// =========================================================================
// Keepalive deadline
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_keepalive_is_due_immediately() {
    let timer = timer_with_timeout(30);
    assert!(timer.keepalive_due(Instant::now()));
    assert_eq!(timer.keepalives_sent(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_keepalive_due_again_after_interval() {
    let mut timer = timer_with_timeout(30);
    timer.record_keepalive(Instant::now());
    assert!(!timer.keepalive_due(Instant::now()));

    advance(Duration::from_millis(4_999)).await;
    assert!(!timer.keepalive_due(Instant::now()));

    advance(Duration::from_millis(1)).await;
    assert!(timer.keepalive_due(Instant::now()));

    timer.record_keepalive(Instant::now());
    assert!(!timer.keepalive_due(Instant::now()));
    assert_eq!(timer.keepalives_sent(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_valid_frames_do_not_delay_keepalives() {
    let mut timer = timer_with_timeout(30);
    timer.record_keepalive(Instant::now());

    advance(Duration::from_secs(3)).await;
    timer.record_valid_frame(Instant::now());
    advance(Duration::from_secs(2)).await;

    assert!(timer.keepalive_due(Instant::now()));
}

// =========================================================================
// Timeout deadline
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_timeout_fires_exactly_once() {
    let mut timer = timer_with_timeout(10);

    advance(Duration::from_secs(9)).await;
    assert_eq!(timer.check_timeout(Instant::now()), None);

    advance(Duration::from_secs(1)).await;
    assert_eq!(
        timer.check_timeout(Instant::now()),
        Some(Duration::from_secs(10))
    );
    assert!(timer.is_timed_out());

    advance(Duration::from_secs(60)).await;
    assert_eq!(timer.check_timeout(Instant::now()), None);
}

#[tokio::test(start_paused = true)]
async fn test_valid_frame_resets_timeout_clock() {
    let mut timer = timer_with_timeout(10);

    advance(Duration::from_secs(8)).await;
    timer.record_valid_frame(Instant::now());

    advance(Duration::from_secs(8)).await;
    assert_eq!(timer.check_timeout(Instant::now()), None);
    assert_eq!(timer.silence(Instant::now()), Duration::from_secs(8));

    advance(Duration::from_secs(2)).await;
    assert!(timer.check_timeout(Instant::now()).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_keepalives_do_not_reset_timeout_clock() {
    let mut timer = timer_with_timeout(10);
    for _ in 0..2 {
        timer.record_keepalive(Instant::now());
        advance(Duration::from_secs(5)).await;
    }
    assert!(timer.check_timeout(Instant::now()).is_some());
}

#[tokio::test(start_paused = true)]
async fn test_starting_at_backdates_receive_clock() {
    let start = Instant::now();
    advance(Duration::from_secs(4)).await;

    let mut timer =
        SessionTimer::starting_at(TimerConfig::with_timeout(Duration::from_secs(4)), start);
    assert!(timer.check_timeout(Instant::now()).is_some());
}
