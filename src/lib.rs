//! Ward Cache - read-through TTL cache for a hospital-management backend
//!
//! Provides an in-process key/value cache with per-entry expiration and
//! wildcard-pattern invalidation, plus a small diagnostic HTTP surface.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod keys;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheBackend, CacheStats, TtlCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_sweep_task;
