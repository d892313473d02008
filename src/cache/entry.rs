//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use serde_json::Value;
use tokio::task::AbortHandle;
use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug)]
pub struct CacheEntry {
    /// The stored value
    pub value: Value,
    /// Time of insertion or last write
    pub stored_at: Instant,
    /// Lifetime of the entry
    pub ttl: Duration,
    /// Identity of the write that produced this entry
    pub generation: u64,
    /// Scheduled removal task, if one was spawned
    pub(crate) expiry: Option<AbortHandle>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - How long the entry stays fresh
    /// * `generation` - Write identity handed out by the store
    pub fn new(value: Value, ttl: Duration, generation: u64) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
            ttl,
            generation,
            expiry: None,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks if the entry is expired at `now`.
    ///
    /// Boundary condition: an entry exactly `ttl` old is still fresh. It
    /// expires only once `now - stored_at > ttl`.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }

    /// Last instant at which the entry is still fresh, `None` if that lies
    /// beyond what `Instant` can represent.
    pub fn deadline(&self) -> Option<Instant> {
        self.stored_at.checked_add(self.ttl)
    }

    // == Time To Live ==
    /// Returns the remaining freshness, `Duration::ZERO` once the deadline passed.
    pub fn ttl_remaining(&self) -> Duration {
        let elapsed = Instant::now().saturating_duration_since(self.stored_at);
        self.ttl.saturating_sub(elapsed)
    }

    /// Aborts the scheduled removal, if any.
    pub(crate) fn cancel_expiry(&mut self) {
        if let Some(handle) = self.expiry.take() {
            handle.abort();
        }
    }
}

impl Drop for CacheEntry {
    fn drop(&mut self) {
        self.cancel_expiry();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"name": "Ada"}), Duration::from_secs(60), 1);

        assert_eq!(entry.value["name"], "Ada");
        assert_eq!(entry.generation, 1);
        assert!(entry.expiry.is_none());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_expiration_boundary_is_fresh() {
        let entry = CacheEntry::new(json!(1), Duration::from_millis(100), 1);
        let at_boundary = entry.stored_at + Duration::from_millis(100);

        assert!(!entry.is_expired_at(at_boundary), "exactly ttl old is fresh");
        assert!(entry.is_expired_at(at_boundary + Duration::from_millis(1)));
    }

    #[test]
    fn test_before_store_time_is_fresh() {
        let entry = CacheEntry::new(json!(1), Duration::from_millis(100), 1);
        // A `now` taken before the write must not underflow
        assert!(!entry.is_expired_at(entry.stored_at - Duration::from_millis(5)));
    }

    #[test]
    fn test_deadline() {
        let entry = CacheEntry::new(json!(null), Duration::from_secs(10), 7);
        assert_eq!(entry.deadline(), Some(entry.stored_at + Duration::from_secs(10)));
    }

    #[test]
    fn test_unrepresentable_deadline() {
        let entry = CacheEntry::new(json!(null), Duration::MAX, 1);

        assert_eq!(entry.deadline(), None);
        assert!(!entry.is_expired());
        assert!(entry.ttl_remaining() > Duration::from_secs(u64::MAX / 2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_remaining() {
        let entry = CacheEntry::new(json!("x"), Duration::from_secs(10), 1);
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(entry.ttl_remaining(), Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(entry.ttl_remaining(), Duration::ZERO);
        assert!(entry.is_expired());
    }
}
