//! Token-bucket limiter for provider-backed endpoints
//!
//! Every `/process`, `/get_summary` and helper request costs one or more paid
//! provider calls. The bucket holds up to `capacity` tokens and refills at
//! `refill_rate` tokens per second; a request that finds it empty is refused
//! before any provider traffic happens.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

// Tokens are stored multiplied by SCALE so partial refills accumulate.
const SCALE: u64 = 1000;

/// Largest bucket whose scaled token count fits in a `u64`
pub const MAX_CAPACITY: u64 = u64::MAX / SCALE;

/// Thread-safe token bucket
pub struct RateLimiter {
    capacity: u64,
    refill_rate: f64,
    tokens_scaled: AtomicU64,
    last_refill: Mutex<Instant>,
}

impl RateLimiter {
    /// Bucket starting full with `capacity` tokens, refilled at `refill_rate`/sec
    pub fn new(capacity: u64, refill_rate: f64) -> Self {
        Self {
            capacity,
            refill_rate,
            tokens_scaled: AtomicU64::new(capacity.saturating_mul(SCALE)),
            last_refill: Mutex::new(Instant::now()),
        }
    }

    /// Burst of 20, then 2 requests/sec
    pub fn with_defaults() -> Self {
        Self::new(20, 2.0)
    }

    /// Take one token; `false` means the caller is rate limited
    pub fn try_acquire(&self) -> bool {
        self.refill();

        let mut current = self.tokens_scaled.load(Ordering::Relaxed);
        loop {
            if current < SCALE {
                return false;
            }
            match self.tokens_scaled.compare_exchange_weak(
                current,
                current - SCALE,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }

    /// Like `try_acquire`, but reports how long to wait on refusal
    pub fn check(&self) -> Result<(), RateLimitError> {
        if self.try_acquire() {
            Ok(())
        } else {
            Err(RateLimitError::new(self.refill_rate))
        }
    }

    fn refill(&self) {
        let now = Instant::now();
        let mut last = self
            .last_refill
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let earned =
            (now.duration_since(*last).as_secs_f64() * self.refill_rate * SCALE as f64) as u64;
        if earned == 0 {
            return;
        }
        *last = now;

        let max_scaled = self.capacity.saturating_mul(SCALE);
        let _ = self
            .tokens_scaled
            .fetch_update(Ordering::SeqCst, Ordering::Relaxed, |current| {
                Some(current.saturating_add(earned).min(max_scaled))
            });
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }
}

/// Refusal returned by [`RateLimiter::check`]
#[derive(Debug)]
pub struct RateLimitError {
    /// Time until the next token is earned
    pub retry_after: Duration,
}

impl RateLimitError {
    pub fn new(refill_rate: f64) -> Self {
        let retry_secs = if refill_rate > 0.0 {
            1.0 / refill_rate
        } else {
            1.0
        };
        Self {
            retry_after: Duration::from_secs_f64(retry_secs),
        }
    }
}

impl std::fmt::Display for RateLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rate limited. Retry after {:?}", self.retry_after)
    }
}

impl std::error::Error for RateLimitError {}
