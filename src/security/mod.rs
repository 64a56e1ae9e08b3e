//! Request admission control
//!
//! The backend fronts a paid, quota-limited provider API, so provider-backed
//! endpoints pass through a token bucket before any provider call is made.

pub mod rate_limit;

pub use rate_limit::{RateLimitError, RateLimiter};
