//! Key-value cache used to share access tokens
//!
//! Providers only need two operations: read a value and write one with a
//! time-to-live. Any store with per-key expiry (in-process map, Redis,
//! memcached) can back a provider by implementing [`Cache`].

mod memory;

pub use memory::MemoryCache;

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a [`Cache`] backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("invalid ttl for key {key}: {ttl:?}")]
    InvalidTtl { key: String, ttl: Duration },

    #[error("cache backend failure: {0}")]
    Backend(String),
}

/// Cache contract shared by all credential providers.
///
/// Implementations must be safe to share across threads. A value written with
/// [`set`](Cache::set) must read as absent once its TTL has elapsed; there is
/// no explicit delete.
pub trait Cache: Send + Sync {
    /// Returns the live value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}
