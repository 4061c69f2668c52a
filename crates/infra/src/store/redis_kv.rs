//! Redis-backed store.
//!
//! Uses a multiplexed `ConnectionManager` (automatic reconnection), cloned
//! per call. Message records are Redis hashes, job statuses plain strings.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};

use super::{Store, StoreError, StoreResult};

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

// KEYS[1] key; ARGV[1] "1" when the key must be absent, ARGV[2] expected
// value, ARGV[3] new value, ARGV[4] expiry in milliseconds or "".
const COMPARE_AND_SET: &str = r"
local cur = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
    if cur then return 0 end
elseif cur ~= ARGV[2] then
    return 0
end
if ARGV[4] ~= '' then
    redis.call('SET', KEYS[1], ARGV[3], 'PX', ARGV[4])
else
    redis.call('SET', KEYS[1], ARGV[3])
end
return 1
";

/// Expiry in whole milliseconds, at least 1ms.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    compare_and_set: Arc<redis::Script>,
}

impl RedisStore {
    /// Connect to Redis. Supports `redis://` and `rediss://` URLs; the
    /// database index in the URL path selects the keyspace.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self {
            conn,
            compare_and_set: Arc::new(redis::Script::new(COMPARE_AND_SET)),
        })
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut conn = self.conn.clone();
        Ok(conn.incr(key, 1).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(ttl) => {
                redis::cmd("SET")
                    .arg(key)
                    .arg(value)
                    .arg("PX")
                    .arg(ttl_millis(ttl))
                    .query_async::<_, ()>(&mut conn)
                    .await?
            }
            None => {
                let _: () = conn.set(key, value).await?;
            }
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        let written: i64 = self
            .compare_and_set
            .key(key)
            .arg(if expected.is_none() { "1" } else { "0" })
            .arg(expected.unwrap_or_default())
            .arg(value)
            .arg(ttl.map(|t| ttl_millis(t).to_string()).unwrap_or_default())
            .invoke_async::<_, i64>(&mut conn)
            .await?;
        Ok(written == 1)
    }

    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.hset_multiple(key, fields).await?;
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let mut conn = self.conn.clone();
        Ok(conn.hgetall(key).await?)
    }

    async fn del(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn.clone();
        Ok(conn.del(key).await?)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let mut conn = self.conn.clone();
        Ok(conn.exists(key).await?)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut conn = self.conn.clone();
        let pattern = format!("{prefix}*");
        let mut iter: redis::AsyncIter<'_, String> = conn.scan_match(pattern).await?;

        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests require a running Redis instance:
    // docker run -d -p 6379:6379 redis:7

    const TEST_URL: &str = "redis://127.0.0.1:6379/15";

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn incr_and_hash_round_trip() -> StoreResult<()> {
        let store = RedisStore::connect(TEST_URL).await?;
        store.del("courier_test_counter").await?;

        assert_eq!(store.incr("courier_test_counter").await?, 1);
        assert_eq!(store.incr("courier_test_counter").await?, 2);

        store
            .hset("courier_test:1", &[("id", "1"), ("content", "hi")])
            .await?;
        let all = store.hgetall("courier_test:1").await?;
        assert_eq!(all.get("content").map(String::as_str), Some("hi"));

        let keys = store.keys_with_prefix("courier_test:").await?;
        assert!(keys.contains(&"courier_test:1".to_string()));

        assert_eq!(store.del("courier_test:1").await?, 1);
        assert!(!store.exists("courier_test:1").await?);
        store.del("courier_test_counter").await?;
        Ok(())
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn scalar_with_expiry() -> StoreResult<()> {
        let store = RedisStore::connect(TEST_URL).await?;
        store
            .set("courier_test_job", "pending", Some(Duration::from_secs(1)))
            .await?;
        assert_eq!(store.get("courier_test_job").await?.as_deref(), Some("pending"));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(store.get("courier_test_job").await?, None);
        Ok(())
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn compare_and_set_guards_the_current_value() -> StoreResult<()> {
        let store = RedisStore::connect(TEST_URL).await?;
        store.del("courier_test_cas").await?;

        assert!(store.compare_and_set("courier_test_cas", None, "pending", None).await?);
        assert!(
            !store
                .compare_and_set("courier_test_cas", None, "completed", None)
                .await?
        );
        assert!(
            store
                .compare_and_set(
                    "courier_test_cas",
                    Some("pending"),
                    "completed",
                    Some(Duration::from_millis(1500)),
                )
                .await?
        );
        assert!(
            !store
                .compare_and_set("courier_test_cas", Some("pending"), "failed:x", None)
                .await?
        );
        assert_eq!(store.get("courier_test_cas").await?.as_deref(), Some("completed"));

        store.del("courier_test_cas").await?;
        Ok(())
    }

    #[test]
    fn sub_second_ttl_keeps_millisecond_resolution() {
        assert_eq!(ttl_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
    }
}
