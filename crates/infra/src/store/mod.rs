//! Key-value/hash store collaborator.
//!
//! Every component receives an explicit [`SharedStore`] handle; there is no
//! process-global client. All coordination between the API and the worker
//! happens through this store.
//!
//! Required primitives:
//! - atomic counter increment (single round-trip)
//! - scalar set/get (optional expiry), hash set/get-all, delete, existence
//! - scalar compare-and-set (single round-trip)
//! - key enumeration by prefix

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};

pub mod in_memory;
pub mod keys;
#[cfg(feature = "redis")]
pub mod redis_kv;

pub use in_memory::InMemoryStore;
#[cfg(feature = "redis")]
pub use redis_kv::RedisStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store handle shared by every component for the lifetime of the process.
pub type SharedStore = Arc<dyn Store>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store command error: {0}")]
    Command(String),

    #[error("wrong value type at key {0}")]
    WrongType(String),

    #[error("value at key {0} is not an integer")]
    NotAnInteger(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Atomically increment the counter at `key` and return the new value.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Set a scalar value, optionally expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()>;

    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Atomically set the scalar at `key` to `value` only if it currently
    /// holds `expected` (`None`: the key must be absent). Returns whether
    /// the write happened.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<bool>;

    /// Set fields on the hash at `key`, creating it if absent.
    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> StoreResult<()>;

    /// All fields of the hash at `key`; empty when the key is absent.
    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>>;

    /// Delete `key` (scalar or hash). Returns the number of keys removed.
    async fn del(&self, key: &str) -> StoreResult<u64>;

    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Enumerate keys starting with `prefix`, in no particular order.
    async fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>>;
}

/// Open the store described by `config`.
pub async fn connect(config: &StoreConfig) -> StoreResult<SharedStore> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; state is local to this process");
            Ok(Arc::new(InMemoryStore::new()))
        }
        #[cfg(feature = "redis")]
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.redis_url).await?;
            tracing::info!(redis_url = %config.redis_url, "connected to redis store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        StoreBackend::Redis => Err(StoreError::Connection(
            "redis backend requested but the `redis` feature is disabled".to_string(),
        )),
    }
}
