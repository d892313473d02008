//! Cache Module
//!
//! Provides the in-memory TTL cache with pattern invalidation, the backend
//! contract it implements, and typed read-through helpers.

mod backend;
mod entry;
mod pattern;
mod read_through;
mod stats;
mod store;


use std::time::Duration;

// Re-export public types
pub use backend::CacheBackend;
pub use entry::CacheEntry;
pub use pattern::{KeyPattern, WILDCARD};
pub use read_through::{get_json, get_or_load, set_json};
pub use stats::CacheStats;
pub use store::TtlCache;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// TTL used by `TtlCache::default()`
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
