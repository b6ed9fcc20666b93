//! Resolver tuning
//!
//! Defaults are the classic protocol constants; tests and demos shrink them.

use std::time::Duration;

/// How long a learned mapping stays usable
pub const CACHE_TTL: Duration = Duration::from_secs(10);
/// Maximum number of cached mappings
pub const CACHE_CAPACITY: usize = 100;
/// Requests sent before a resolution gives up
pub const MAX_ATTEMPTS: u32 = 3;
/// Wait after each request
pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpConfig {
    pub cache_ttl: Duration,
    pub cache_capacity: usize,
    pub max_attempts: u32,
    pub retry_interval: Duration,
}

impl Default for ArpConfig {
    fn default() -> Self {
        ArpConfig {
            cache_ttl: CACHE_TTL,
            cache_capacity: CACHE_CAPACITY,
            max_attempts: MAX_ATTEMPTS,
            retry_interval: RETRY_INTERVAL,
        }
    }
}

impl ArpConfig {
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// A capacity of zero is treated as one
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    /// Longest a single resolution can block its caller
    pub fn resolution_budget(&self) -> Duration {
        self.retry_interval * self.max_attempts
    }
}
