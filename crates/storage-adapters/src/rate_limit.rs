//! Fixed-window attempt counter keyed by caller (normally the peer IP).

use std::time::{Duration, Instant};

use dashmap::DashMap;
use domains::{RateDecision, RateLimiter};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    hits: u32,
}

pub struct FixedWindowRateLimiter {
    max_attempts: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl FixedWindowRateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            windows: DashMap::new(),
        }
    }

    fn hit_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut entry = self
            .windows
            .entry(key.to_owned())
            .or_insert(Window { started: now, hits: 0 });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window { started: now, hits: 0 };
        }

        if entry.hits >= self.max_attempts {
            let elapsed = now.duration_since(entry.started);
            let retry_after_secs = self.window.saturating_sub(elapsed).as_secs().max(1);
            return RateDecision::Limited { retry_after_secs };
        }

        entry.hits += 1;
        RateDecision::Allowed { remaining: self.max_attempts - entry.hits }
    }

    /// Drops windows that have fully elapsed.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }
}

impl RateLimiter for FixedWindowRateLimiter {
    fn hit(&self, key: &str) -> RateDecision {
        self.hit_at(key, Instant::now())
    }
}
