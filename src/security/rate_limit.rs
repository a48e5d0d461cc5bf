//! Per-client fixed-window rate limiting.
//!
//! Each client identity owns one counter. The window opens on the client's
//! first hit and the counter resets on the first hit after it closes.
//! Rejected hits still count.

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};
use dashmap::DashMap;

use crate::config::schema::RateLimitConfig;
use crate::security::clock::Clock;

#[derive(Debug, Clone, Copy)]
struct RateCounter {
    hits: u32,
    window_start: Instant,
}

/// Result of recording one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    /// Time until the client's window closes.
    pub reset_after: Duration,
}

/// Counter table keyed by client identity.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    counters: DashMap<String, RateCounter>,
    window: Duration,
    max_requests: u32,
    standard_headers: bool,
    legacy_headers: bool,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    pub fn new(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: DashMap::new(),
            window: Duration::from_millis(config.window_ms),
            max_requests: config.max_requests,
            standard_headers: config.standard_headers,
            legacy_headers: config.legacy_headers,
            clock,
        }
    }

    /// Record a hit for `client` and decide whether it fits in the window.
    pub fn hit(&self, client: &str) -> RateLimitDecision {
        let now = self.clock.now();

        // The entry guard holds the shard lock, so reset-increment-compare is atomic per key.
        let mut counter = self
            .counters
            .entry(client.to_string())
            .or_insert(RateCounter {
                hits: 0,
                window_start: now,
            });

        if now.duration_since(counter.window_start) >= self.window {
            counter.hits = 0;
            counter.window_start = now;
        }
        counter.hits = counter.hits.saturating_add(1);

        let elapsed = now.duration_since(counter.window_start);
        RateLimitDecision {
            allowed: counter.hits <= self.max_requests,
            limit: self.max_requests,
            remaining: self.max_requests.saturating_sub(counter.hits),
            reset_after: self.window.saturating_sub(elapsed),
        }
    }

    /// Undo one hit for `client` in its current window.
    pub fn refund(&self, client: &str) {
        if let Some(mut counter) = self.counters.get_mut(client) {
            counter.hits = counter.hits.saturating_sub(1);
        }
    }

    /// Drop counters whose window has closed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.counters.len();
        self.counters
            .retain(|_, counter| now.duration_since(counter.window_start) < self.window);
        before.saturating_sub(self.counters.len())
    }

    pub fn tracked_identities(&self) -> usize {
        self.counters.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Informational headers for a decision. Rejections also get `Retry-After`.
    pub fn headers(&self, decision: &RateLimitDecision) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let reset_secs = ceil_secs(decision.reset_after);

        if self.standard_headers {
            headers.insert(
                HeaderName::from_static("ratelimit-policy"),
                header_value(format!("{};w={}", decision.limit, ceil_secs(self.window))),
            );
            headers.insert(
                HeaderName::from_static("ratelimit-limit"),
                HeaderValue::from(decision.limit),
            );
            headers.insert(
                HeaderName::from_static("ratelimit-remaining"),
                HeaderValue::from(decision.remaining),
            );
            headers.insert(
                HeaderName::from_static("ratelimit-reset"),
                HeaderValue::from(reset_secs),
            );
        }

        if self.legacy_headers {
            let reset_at = SystemTime::now()
                .checked_add(decision.reset_after)
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(ceil_secs)
                .unwrap_or_default();
            headers.insert(
                HeaderName::from_static("x-ratelimit-limit"),
                HeaderValue::from(decision.limit),
            );
            headers.insert(
                HeaderName::from_static("x-ratelimit-remaining"),
                HeaderValue::from(decision.remaining),
            );
            headers.insert(
                HeaderName::from_static("x-ratelimit-reset"),
                HeaderValue::from(reset_at),
            );
        }

        if !decision.allowed && (self.standard_headers || self.legacy_headers) {
            headers.insert(header::RETRY_AFTER, HeaderValue::from(reset_secs));
        }

        headers
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_millis().div_ceil(1000) as u64
}

fn header_value(s: String) -> HeaderValue {
    HeaderValue::from_str(&s).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::clock::ManualClock;

    fn limiter(window_ms: u64, max_requests: u32) -> (FixedWindowLimiter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = RateLimitConfig {
            window_ms,
            max_requests,
            ..Default::default()
        };
        (FixedWindowLimiter::new(&config, clock.clone()), clock)
    }

    #[test]
    fn one_per_window_then_reset() {
        let (limiter, clock) = limiter(5_000, 1);

        assert!(limiter.hit("10.0.0.1").allowed);

        clock.advance(Duration::from_secs(1));
        let second = limiter.hit("10.0.0.1");
        assert!(!second.allowed);
        assert_eq!(second.remaining, 0);
        assert_eq!(second.reset_after, Duration::from_secs(4));

        clock.advance(Duration::from_secs(5));
        assert!(limiter.hit("10.0.0.1").allowed);
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let (limiter, clock) = limiter(5_000, 1);
        assert!(limiter.hit("a").allowed);

        clock.advance(Duration::from_millis(4_999));
        assert!(!limiter.hit("a").allowed);

        clock.advance(Duration::from_millis(1));
        assert!(limiter.hit("a").allowed);
    }

    #[test]
    fn identities_are_isolated() {
        let (limiter, _clock) = limiter(5_000, 1);

        assert!(limiter.hit("10.0.0.1").allowed);
        assert!(limiter.hit("10.0.0.2").allowed);
        assert!(!limiter.hit("10.0.0.1").allowed);
        assert!(!limiter.hit("10.0.0.2").allowed);
        assert_eq!(limiter.tracked_identities(), 2);
    }

    #[test]
    fn remaining_counts_down() {
        let (limiter, _clock) = limiter(60_000, 3);

        assert_eq!(limiter.hit("a").remaining, 2);
        assert_eq!(limiter.hit("a").remaining, 1);
        assert_eq!(limiter.hit("a").remaining, 0);
        let fourth = limiter.hit("a");
        assert!(!fourth.allowed);
        assert_eq!(fourth.remaining, 0);
    }

    #[test]
    fn refund_returns_a_slot() {
        let (limiter, _clock) = limiter(5_000, 1);

        assert!(limiter.hit("a").allowed);
        limiter.refund("a");
        assert!(limiter.hit("a").allowed);
        assert!(!limiter.hit("a").allowed);

        // Unknown identities are a no-op.
        limiter.refund("nobody");
        assert_eq!(limiter.tracked_identities(), 1);
    }

    #[test]
    fn purge_drops_closed_windows() {
        let (limiter, clock) = limiter(5_000, 1);
        limiter.hit("a");
        clock.advance(Duration::from_secs(3));
        limiter.hit("b");

        clock.advance(Duration::from_secs(3));
        assert_eq!(limiter.purge_expired(), 1);
        assert_eq!(limiter.tracked_identities(), 1);
    }

    #[test]
    fn standard_headers_without_legacy() {
        let (limiter, clock) = limiter(5_000, 1);
        let first = limiter.hit("a");
        let headers = limiter.headers(&first);

        assert_eq!(headers["ratelimit-policy"], "1;w=5");
        assert_eq!(headers["ratelimit-limit"], "1");
        assert_eq!(headers["ratelimit-remaining"], "0");
        assert_eq!(headers["ratelimit-reset"], "5");
        assert!(headers.get("x-ratelimit-limit").is_none());
        assert!(headers.get(header::RETRY_AFTER).is_none());

        clock.advance(Duration::from_millis(1_500));
        let second = limiter.hit("a");
        let headers = limiter.headers(&second);
        assert_eq!(headers["ratelimit-reset"], "4");
        assert_eq!(headers[header::RETRY_AFTER], "4");
    }

    #[test]
    fn legacy_headers_when_enabled() {
        let clock = Arc::new(ManualClock::new());
        let config = RateLimitConfig {
            standard_headers: false,
            legacy_headers: true,
            ..Default::default()
        };
        let limiter = FixedWindowLimiter::new(&config, clock);
        let headers = limiter.headers(&limiter.hit("a"));

        assert!(headers.get("ratelimit-limit").is_none());
        assert_eq!(headers["x-ratelimit-limit"], "1");
        assert!(headers.get("x-ratelimit-reset").is_some());
    }
}
