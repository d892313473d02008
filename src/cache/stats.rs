//! Cache Statistics Module
//!
//! Diagnostic snapshot of the cache contents and read counters.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time view of the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries
    pub size: usize,
    /// Stored keys, in no particular order
    pub keys: Vec<String>,
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that found nothing or a stale entry
    pub misses: u64,
    /// Number of entries removed because their TTL elapsed
    pub expirations: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn stats(hits: u64, misses: u64) -> CacheStats {
        CacheStats {
            hits,
            misses,
            ..CacheStats::default()
        }
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(stats(0, 0).hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_all_hits() {
        assert_eq!(stats(3, 0).hit_rate(), 1.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        assert_eq!(stats(1, 1).hit_rate(), 0.5);
    }

    #[test]
    fn test_stats_serialize() {
        let snapshot = CacheStats {
            size: 1,
            keys: vec!["patients:1".to_string()],
            ..CacheStats::default()
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["size"], 1);
        assert_eq!(json["keys"][0], "patients:1");
    }
}
