//! Cache Backend Module
//!
//! The contract every cache implementation fulfils. `TtlCache` is the
//! in-process implementation; a shared remote store can be plugged in
//! behind the same trait.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::cache::{CacheStats, TtlCache};
use crate::error::Result;

#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Stores `value` under `key`; `None` uses the backend's default TTL.
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()>;

    /// Returns the live value for `key`, `Ok(None)` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Removes `key`; returns whether an entry was removed.
    async fn delete(&self, key: &str) -> Result<bool>;

    /// Removes every key matching the glob `pattern`; returns the count.
    async fn invalidate(&self, pattern: &str) -> Result<usize>;

    async fn clear(&self) -> Result<()>;

    async fn stats(&self) -> Result<CacheStats>;
}

#[async_trait]
impl CacheBackend for TtlCache {
    async fn set(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        TtlCache::set(self, key, value, ttl)
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(TtlCache::get(self, key))
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(TtlCache::delete(self, key))
    }

    async fn invalidate(&self, pattern: &str) -> Result<usize> {
        TtlCache::invalidate(self, pattern)
    }

    async fn clear(&self) -> Result<()> {
        TtlCache::clear(self);
        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats> {
        Ok(TtlCache::stats(self))
    }
}
