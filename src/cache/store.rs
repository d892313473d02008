//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with per-entry expiry tasks
//! and lazy TTL checks.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStats, KeyPattern, DEFAULT_TTL, MAX_KEY_LENGTH};
use crate::error::{CacheError, Result};

/// Expiry tasks fire one tick past the deadline so that an entry exactly
/// `ttl` old is still served, matching `CacheEntry::is_expired_at`.
const EXPIRY_GRACE: Duration = Duration::from_millis(1);

// == Shared State ==
#[derive(Debug, Default)]
struct State {
    entries: HashMap<String, CacheEntry>,
    next_generation: u64,
    hits: u64,
    misses: u64,
    expirations: u64,
}

impl State {
    /// Removes matching entries and returns how many of them were still live.
    /// Stale ones are counted as expirations.
    fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&str, &CacheEntry) -> bool,
    {
        let now = Instant::now();
        let mut live = 0;
        let mut stale: u64 = 0;
        self.entries.retain(|key, entry| {
            if !predicate(key, entry) {
                return true;
            }
            if entry.is_expired_at(now) {
                stale += 1;
            } else {
                live += 1;
            }
            false
        });
        self.expirations += stale;
        live
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
}

impl Shared {
    /// Removes `key` only if it still holds the write identified by `generation`.
    fn expire(&self, key: &str, generation: u64) -> bool {
        let mut state = self.state.lock();
        let current = state
            .entries
            .get(key)
            .is_some_and(|entry| entry.generation == generation);
        if current {
            state.entries.remove(key);
            state.expirations += 1;
        }
        current
    }
}

// == TTL Cache ==
/// Process-wide key/value cache with per-entry expiration and
/// wildcard-pattern invalidation.
///
/// Cloning is cheap and yields another handle to the same cache. Every
/// operation takes one lock around the map and its timer bookkeeping, so
/// readers never observe a half-written entry.
///
/// Expiration is enforced twice: each `set` spawns a removal task on the
/// current tokio runtime, and `get` independently treats stale entries as
/// absent. Without a runtime no task is spawned and the lazy check (plus
/// [`purge_expired`](Self::purge_expired)) does the work.
#[derive(Debug, Clone)]
pub struct TtlCache {
    shared: Arc<Shared>,
    default_ttl: Duration,
}

impl TtlCache {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied when `set` is called without one
    pub fn new(default_ttl: Duration) -> Result<Self> {
        validate_ttl(default_ttl)?;
        Ok(Self {
            shared: Arc::new(Shared::default()),
            default_ttl,
        })
    }

    /// TTL applied when `set` is called without one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    ///
    /// The replaced entry's removal task is aborted under the same lock that
    /// installs the new one. Arguments are validated before anything is touched.
    ///
    /// # Arguments
    /// * `key` - Non-empty key of at most `MAX_KEY_LENGTH` bytes
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses the default TTL if None)
    pub fn set(&self, key: impl Into<String>, value: Value, ttl: Option<Duration>) -> Result<()> {
        let key = key.into();
        validate_key(&key)?;
        let ttl = ttl.unwrap_or(self.default_ttl);
        validate_ttl(ttl)?;

        let mut state = self.shared.state.lock();
        state.next_generation += 1;
        let generation = state.next_generation;

        let mut entry = CacheEntry::new(value, ttl, generation);
        // A deadline past what `Instant` can hold is left to the lazy check
        entry.expiry = entry
            .deadline()
            .and_then(|deadline| deadline.checked_add(EXPIRY_GRACE))
            .and_then(|at| self.schedule_expiry(&key, generation, at));

        // Dropping the replaced entry aborts its removal task
        if let Some(previous) = state.entries.insert(key.clone(), entry) {
            debug!(key = %key, replaced = previous.generation, "Cache entry refreshed");
        } else {
            debug!(key = %key, ttl = ?ttl, "Cache entry stored");
        }

        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns `None` for missing or expired keys. A stale entry whose
    /// removal task has not run yet is removed here.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;

        let expired = match state.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                state.hits += 1;
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.entries.remove(key);
            state.expirations += 1;
            debug!(key = %key, "Stale cache entry removed on read");
        }
        state.misses += 1;
        None
    }

    // == Delete ==
    /// Removes an entry by key and cancels its removal task.
    ///
    /// Returns whether a live entry was removed. A stale entry is dropped
    /// too but reported as absent.
    pub fn delete(&self, key: &str) -> bool {
        let mut state = self.shared.state.lock();
        let Some(entry) = state.entries.remove(key) else {
            return false;
        };

        if entry.is_expired() {
            state.expirations += 1;
            debug!(key = %key, "Stale cache entry removed on delete");
            return false;
        }
        debug!(key = %key, "Cache entry deleted");
        true
    }

    // == Invalidate ==
    /// Removes every key matching the glob `pattern`.
    ///
    /// Returns the number of live entries removed; matching stale entries
    /// are dropped without being counted.
    pub fn invalidate(&self, pattern: &str) -> Result<usize> {
        let pattern = KeyPattern::compile(pattern)?;
        let removed = self
            .shared
            .state
            .lock()
            .remove_where(|key, _| pattern.is_match(key));

        info!(pattern = %pattern.as_str(), removed, "Cache invalidated");
        Ok(removed)
    }

    // == Clear ==
    /// Removes all entries and cancels all pending removal tasks.
    pub fn clear(&self) {
        let removed = {
            let mut state = self.shared.state.lock();
            let count = state.entries.len();
            state.entries.clear();
            count
        };
        if removed > 0 {
            info!(removed, "Cache cleared");
        }
    }

    // == Stats ==
    /// Returns a diagnostic snapshot of the cache.
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock();
        CacheStats {
            size: state.entries.len(),
            keys: state.entries.keys().cloned().collect(),
            hits: state.hits,
            misses: state.misses,
            expirations: state.expirations,
        }
    }

    // == Purge Expired ==
    /// Removes all logically expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.shared.state.lock();
        let before = state.entries.len();
        state.entries.retain(|_, entry| !entry.is_expired_at(now));
        let removed = before - state.entries.len();
        state.expirations += removed as u64;
        removed
    }

    /// Returns true if `key` holds a live entry. Does not touch the counters.
    pub fn contains_key(&self, key: &str) -> bool {
        self.shared
            .state
            .lock()
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    // == Length ==
    /// Returns the number of stored entries, including stale ones not yet removed.
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.shared.state.lock().entries.is_empty()
    }

    fn schedule_expiry(&self, key: &str, generation: u64, at: Instant) -> Option<AbortHandle> {
        let runtime = Handle::try_current().ok()?;
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let key = key.to_string();

        let task = runtime.spawn(async move {
            tokio::time::sleep_until(at).await;
            if let Some(shared) = shared.upgrade() {
                if shared.expire(&key, generation) {
                    debug!(key = %key, "Cache entry expired");
                }
            }
        });
        Some(task.abort_handle())
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            default_ttl: DEFAULT_TTL,
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

fn validate_ttl(ttl: Duration) -> Result<()> {
    if ttl.is_zero() {
        return Err(CacheError::InvalidTtl("TTL must be positive".to_string()));
    }
    Ok(())
}
