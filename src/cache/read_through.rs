//! Read-Through Helpers
//!
//! Typed wrappers collaborators use around expensive reads: consult the
//! cache first, run the loader on a miss, store the result.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::CacheBackend;
use crate::error::Result;

/// Returns the cached value for `key`, or runs `load` and caches its result.
///
/// Cache problems never fail the read: a backend error or a payload that no
/// longer deserializes into `T` is logged and treated as a miss, and a
/// failed write after loading only costs the next caller a recompute. The
/// loader's error is returned as is and nothing is cached for it.
pub async fn get_or_load<T, E, F, Fut>(
    cache: &dyn CacheBackend,
    key: &str,
    ttl: Option<Duration>,
    load: F,
) -> std::result::Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    match cache.get(key).await {
        Ok(Some(cached)) => match serde_json::from_value(cached) {
            Ok(value) => return Ok(value),
            Err(e) => warn!(key = %key, error = %e, "Cached payload has unexpected shape"),
        },
        Ok(None) => debug!(key = %key, "Read-through miss"),
        Err(e) => warn!(key = %key, error = %e, "Cache read failed, loading directly"),
    }

    let value = load().await?;

    match serde_json::to_value(&value) {
        Ok(json) => {
            if let Err(e) = cache.set(key, json, ttl).await {
                warn!(key = %key, error = %e, "Failed to populate cache");
            }
        }
        Err(e) => warn!(key = %key, error = %e, "Loaded value is not serializable"),
    }

    Ok(value)
}

/// Fetches `key` and deserializes it into `T`.
pub async fn get_json<T>(cache: &dyn CacheBackend, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match cache.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serializes `value` and stores it under `key`.
pub async fn set_json<T>(
    cache: &dyn CacheBackend,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> Result<()>
where
    T: Serialize + ?Sized,
{
    cache.set(key, serde_json::to_value(value)?, ttl).await
}
