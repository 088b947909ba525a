//! Request pacing
//!
//! Two kinds of delay are applied during a run:
//!
//! - `RequestPacer`: a minimum interval between any two outgoing requests,
//!   shared by every fetch of the process
//! - `pause`: the fixed courtesy delay after each crawled repository

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Enforces a minimum interval between consecutive requests
#[derive(Debug)]
pub struct RequestPacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    /// Creates a pacer with the given minimum interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// A pacer that never waits
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a request may be sent, then records it as sent
    ///
    /// The lock is held across the sleep so concurrent callers queue up
    /// instead of all firing once the interval elapses.
    pub async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(wait) = self.time_until_next_request(*last, Instant::now()) {
            tracing::trace!("Pacing: waiting {:?} before next request", wait);
            tokio::time::sleep(wait).await;
        }

        *last = Some(Instant::now());
    }

    /// Time left before the next request is allowed, if any
    fn time_until_next_request(&self, last: Option<Instant>, now: Instant) -> Option<Duration> {
        let elapsed = now.saturating_duration_since(last?);
        if elapsed < self.min_interval {
            Some(self.min_interval - elapsed)
        } else {
            None
        }
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::unpaced()
    }
}

/// Sleeps for `delay` unless cancelled first
///
/// Returns false when the pause was cut short by cancellation.
pub async fn pause(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }

    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_never_waits() {
        let pacer = RequestPacer::new(Duration::from_millis(500));
        assert_eq!(pacer.time_until_next_request(None, Instant::now()), None);
    }

    #[test]
    fn test_time_until_next_request() {
        let pacer = RequestPacer::new(Duration::from_millis(500));
        let last = Instant::now();

        let wait = pacer
            .time_until_next_request(Some(last), last + Duration::from_millis(200))
            .unwrap();
        assert_eq!(wait, Duration::from_millis(300));

        assert_eq!(
            pacer.time_until_next_request(Some(last), last + Duration::from_millis(500)),
            None
        );
    }

    #[test]
    fn test_unpaced_never_waits() {
        let pacer = RequestPacer::unpaced();
        let now = Instant::now();
        assert_eq!(pacer.time_until_next_request(Some(now), now), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_turn_spaces_requests() {
        let pacer = RequestPacer::new(Duration::from_secs(2));
        let start = Instant::now();

        pacer.wait_turn().await;
        pacer.wait_turn().await;
        pacer.wait_turn().await;

        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_completes() {
        let cancel = CancellationToken::new();
        assert!(pause(Duration::from_secs(3), &cancel).await);
    }

    #[tokio::test]
    async fn test_pause_interrupted_by_cancel() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert!(!pause(Duration::from_secs(3600), &cancel).await);
        assert!(!pause(Duration::ZERO, &cancel).await);
    }
}
