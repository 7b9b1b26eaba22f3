//! Fixed-window rate limiting keyed by client IP
//!
//! A window opens on the first request of a key and lasts `window_ms`. Every
//! request inside it increments the count, rejected ones included; the request
//! pushing the count past `max` and everything after it until the window
//! ends gets a 429. Exactly `max` requests pass per window.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::clock::Clock;
use crate::config::RateLimitConf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitState {
    pub count: u32,
    pub reset_at: i64,
}

/// Keyed counter with expiry. The in-memory store fits a single instance;
/// a multi-instance deployment plugs a shared store in behind the same trait.
pub trait RateLimitStore: Send + Sync {
    /// Count one request for `key` and return the state after counting.
    fn hit(&self, key: &str, now_ms: i64, window_ms: i64) -> RateLimitState;

    /// Drop windows that ended before `now_ms`; returns how many went.
    fn evict_expired(&self, now_ms: i64) -> usize;
}

#[derive(Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, RateLimitState>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn hit(&self, key: &str, now_ms: i64, window_ms: i64) -> RateLimitState {
        let mut windows = self.windows.lock();
        if let Some(state) = windows.get_mut(key) {
            if state.reset_at >= now_ms {
                state.count = state.count.saturating_add(1);
                return *state;
            }
        }

        let state = RateLimitState { count: 1, reset_at: now_ms + window_ms };
        windows.insert(key.to_string(), state);
        state
    }

    fn evict_expired(&self, now_ms: i64) -> usize {
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, state| state.reset_at >= now_ms);
        before - windows.len()
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    window_ms: i64,
    max: u32,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, conf: RateLimitConf) -> Self {
        Self { store, window_ms: conf.window_ms as i64, max: conf.max }
    }

    /// `true` when the request fits in the current window.
    pub fn allow(&self, key: &str, now_ms: i64) -> bool {
        let state = self.store.hit(key, now_ms, self.window_ms);
        if state.count > self.max {
            debug!("rate limit hit for {} ({} in window)", key, state.count);
            return false;
        }
        true
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms.max(1) as u64)
    }
}

/// Evicts ended windows once per window length so the map only holds recent clients.
pub fn spawn_rate_limit_sweeper(
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let evicted = store.evict_expired(clock.now_ms());
            if evicted > 0 {
                debug!("evicted {} expired rate limit windows", evicted);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(store: Arc<InMemoryRateLimitStore>) -> RateLimiter {
        RateLimiter::new(store, RateLimitConf { window_ms: 60_000, max: 8 })
    }

    #[test]
    fn test_eight_pass_ninth_fails() {
        let limiter = limiter(Arc::new(InMemoryRateLimitStore::new()));
        let now = 1_000_000;
        for i in 0..8 {
            assert!(limiter.allow("1.2.3.4", now + i), "request {} should pass", i + 1);
        }
        assert!(!limiter.allow("1.2.3.4", now + 8));
        assert!(!limiter.allow("1.2.3.4", now + 9));
        // other keys are unaffected
        assert!(limiter.allow("5.6.7.8", now + 10));
    }

    #[test]
    fn test_window_resets_after_boundary() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let limiter = limiter(store.clone());
        let start = 1_000_000;
        for _ in 0..9 {
            limiter.allow("ip", start);
        }
        // reset_at itself still belongs to the window
        assert!(!limiter.allow("ip", start + 60_000));

        assert!(limiter.allow("ip", start + 60_001));
        assert_eq!(store.windows.lock()["ip"].count, 1);
    }

    #[test]
    fn test_rejected_requests_still_count() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let limiter = limiter(store.clone());
        for _ in 0..12 {
            limiter.allow("ip", 0);
        }
        assert_eq!(store.windows.lock()["ip"].count, 12);
    }

    #[test]
    fn test_evict_expired() {
        let store = InMemoryRateLimitStore::new();
        store.hit("old", 0, 1_000);
        store.hit("fresh", 5_000, 1_000);
        assert_eq!(store.evict_expired(3_000), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.evict_expired(3_000), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_evicts_in_background() {
        let store = Arc::new(InMemoryRateLimitStore::new());
        let clock = Arc::new(ManualClock::at(0));
        store.hit("ip", 0, 1_000);

        let handle = spawn_rate_limit_sweeper(store.clone(), clock.clone(), Duration::from_secs(1));
        clock.advance(2_000);
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        assert_eq!(store.len(), 0);
        handle.abort();
    }
}
