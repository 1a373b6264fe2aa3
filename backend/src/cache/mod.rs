//! Key-value cache with per-entry expiry.
//!
//! The pipeline keeps two entries here: the latest scrape under
//! [`LATEST_RESULTS_KEY`] and the latest prediction under
//! [`LATEST_PREDICTION_KEY`], both for a week. Values are stored as JSON text
//! so any backend that can hold strings with a TTL can implement
//! [`CacheStore`].

pub mod local;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub use local::LocalCache;

pub const LATEST_RESULTS_KEY: &str = "latestResults";
pub const LATEST_PREDICTION_KEY: &str = "latestPrediction";

/// Default entry lifetime: one week.
pub const ONE_WEEK_SECS: u64 = 7 * 24 * 60 * 60;

/// Errors returned by cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// A string store with expiring entries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Store `value` under `key`, replacing any previous value, for `ttl`.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    /// Fetch the live value under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
}

/// Serialize `value` as JSON and store it.
pub async fn cache_json<T>(
    store: &dyn CacheStore,
    key: &str,
    value: &T,
    ttl: Duration,
) -> Result<(), CacheError>
where
    T: Serialize + ?Sized + Sync,
{
    let json = serde_json::to_string(value)?;
    store.set(key, json, ttl).await
}

/// Read and deserialize a JSON value.
pub async fn get_json<T>(store: &dyn CacheStore, key: &str) -> Result<Option<T>, CacheError>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}
