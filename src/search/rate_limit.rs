//! Sliding-window rate limiter for outbound lookups.

use crate::clock::SharedClock;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct LimiterState {
    /// Start times of calls inside the current window, oldest first
    recent: VecDeque<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
}

/// At most `max_per_window` calls per rolling minute, and at least `min_interval`
/// between two consecutive calls. Waiting goes through the injected clock.
pub struct RateLimiter {
    max_per_window: usize,
    min_interval: Duration,
    state: Mutex<LimiterState>,
    clock: SharedClock,
}

impl RateLimiter {
    pub fn new(max_per_window: u32, min_interval: Duration, clock: SharedClock) -> Self {
        Self {
            max_per_window: max_per_window.max(1) as usize,
            min_interval,
            state: Mutex::new(LimiterState::default()),
            clock,
        }
    }

    /// Wait until a call is allowed, then record it.
    pub async fn acquire(&self) {
        let window_wait = {
            let mut state = self.state.lock();
            let now = self.clock.now();
            prune(&mut state.recent, now);
            if state.recent.len() >= self.max_per_window {
                state
                    .recent
                    .front()
                    .map(|oldest| remaining(*oldest + to_chrono(WINDOW), now))
            } else {
                None
            }
        };
        if let Some(wait) = window_wait.filter(|w| !w.is_zero()) {
            debug!(delay_ms = wait.as_millis() as u64, "Rate limit window full, waiting");
            self.clock.sleep(wait).await;
        }

        let spacing_wait = {
            let state = self.state.lock();
            let now = self.clock.now();
            state.last.map(|last| remaining(last + to_chrono(self.min_interval), now))
        };
        if let Some(wait) = spacing_wait.filter(|w| !w.is_zero()) {
            self.clock.sleep(wait).await;
        }

        let mut state = self.state.lock();
        let now = self.clock.now();
        prune(&mut state.recent, now);
        state.recent.push_back(now);
        state.last = Some(now);
    }

    /// Calls recorded inside the current window
    pub fn in_window(&self) -> usize {
        let mut state = self.state.lock();
        prune(&mut state.recent, self.clock.now());
        state.recent.len()
    }
}

fn prune(recent: &mut VecDeque<DateTime<Utc>>, now: DateTime<Utc>) {
    let cutoff = now - to_chrono(WINDOW);
    while recent.front().is_some_and(|t| *t <= cutoff) {
        recent.pop_front();
    }
}

fn remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (until - now).to_std().unwrap_or(Duration::ZERO)
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_min_interval_spacing() {
        let clock = Arc::new(ManualClock::at_epoch());
        let limiter = RateLimiter::new(100, Duration::from_millis(100), clock.clone());

        limiter.acquire().await;
        limiter.acquire().await;
        clock.advance(Duration::from_millis(30));
        limiter.acquire().await;

        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_millis(100), Duration::from_millis(70)]
        );
    }

    #[tokio::test]
    async fn test_window_limit_waits_for_oldest_call() {
        let clock = Arc::new(ManualClock::at_epoch());
        let limiter = RateLimiter::new(3, Duration::ZERO, clock.clone());

        for _ in 0..3 {
            limiter.acquire().await;
            clock.advance(Duration::from_secs(1));
        }
        assert_eq!(limiter.in_window(), 3);
        assert!(clock.sleeps().is_empty());

        // oldest call was 3s ago, so the window frees up in 57s
        limiter.acquire().await;
        assert_eq!(clock.sleeps(), vec![Duration::from_secs(57)]);
        assert_eq!(limiter.in_window(), 3);
    }
}
