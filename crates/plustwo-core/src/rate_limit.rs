//! Per-client fixed-window rate limiting.
//!
//! The [`RateLimiter`] is process-local and best-effort: it exists to blunt
//! abusive polling, not to enforce a billing-grade quota. State is lost on
//! restart and is not shared between processes.
//!
//! # Model
//!
//! Each client token owns a counter and the instant its current window
//! opened. A request arriving `interval` or more after the window opened
//! starts a fresh window. The map holds at most `capacity` tokens in an
//! LRU cache; every check, admitted or refused, marks the token as
//! recently used, so a full map drops the token that has been quiet the
//! longest.
//!
//! The whole check-and-increment runs under one mutex, so concurrent
//! requests for the same token never lose an update.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;

/// A request was refused because its token used up the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rate limit exceeded; retry after {}s", .retry_after.as_secs())]
pub struct RateLimitExceeded {
    /// Time until the token's current window closes.
    pub retry_after: Duration,
}

/// Limit and interval applied to one class of requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Requests admitted per interval.
    pub limit: u32,
    /// Length of the counting window.
    pub interval: Duration,
}

/// Counter for one token's current window.
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    count: u32,
    window_start: Instant,
}

/// Capacity-bounded map from client token to request counter.
#[derive(Debug)]
pub struct RateLimiter {
    counters: Mutex<LruCache<String, WindowCounter>>,
}

impl RateLimiter {
    /// Create a limiter tracking at most `capacity` tokens (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            counters: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Admit or refuse one request for `token`.
    ///
    /// Succeeds if fewer than `limit` requests were recorded for `token`
    /// in its current window, and records this one.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitExceeded`] if the window is already full. The
    /// refused request is not counted.
    pub fn check(
        &self,
        token: &str,
        limit: u32,
        interval: Duration,
    ) -> Result<(), RateLimitExceeded> {
        self.check_at(token, limit, interval, Instant::now())
    }

    /// [`check`](Self::check) with an explicit clock reading.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitExceeded`] if the window is already full.
    pub fn check_at(
        &self,
        token: &str,
        limit: u32,
        interval: Duration,
        now: Instant,
    ) -> Result<(), RateLimitExceeded> {
        let mut counters = self.counters.lock();

        // `get_mut` promotes the token to most recently used.
        let Some(counter) = counters.get_mut(token) else {
            if limit == 0 {
                return Err(RateLimitExceeded { retry_after: interval });
            }
            let counter = WindowCounter {
                count: 1,
                window_start: now,
            };
            if let Some((evicted, _)) = counters.push(token.to_owned(), counter) {
                tracing::trace!(token = %evicted, "Evicted rate limit entry");
            }
            return Ok(());
        };

        let elapsed = now.saturating_duration_since(counter.window_start);
        if elapsed >= interval {
            counter.count = 0;
            counter.window_start = now;
        }

        if counter.count >= limit {
            let waited = now.saturating_duration_since(counter.window_start);
            return Err(RateLimitExceeded {
                retry_after: interval.saturating_sub(waited),
            });
        }

        counter.count = counter.count.saturating_add(1);
        Ok(())
    }

    /// [`check`](Self::check) using a policy's limit and interval.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitExceeded`] if the window is already full.
    pub fn check_policy(
        &self,
        token: &str,
        policy: RateLimitPolicy,
    ) -> Result<(), RateLimitExceeded> {
        self.check(token, policy.limit, policy.interval)
    }

    /// Number of tokens currently tracked.
    pub fn tracked(&self) -> usize {
        self.counters.lock().len()
    }

    /// Maximum number of tokens tracked at once.
    pub fn capacity(&self) -> usize {
        self.counters.lock().cap().get()
    }
}
