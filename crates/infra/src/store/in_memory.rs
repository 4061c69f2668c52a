//! In-memory store for tests/dev.
//!
//! Semantics follow Redis for the primitives in use: `INCR` on a missing key
//! starts from zero, `HSET` merges fields, reads of a key holding the other
//! kind of value fail with `WrongType`, expired keys behave as absent.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{Store, StoreError, StoreResult};

#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    Hash(HashMap<String, String>),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<HashMap<String, Entry>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<String, Entry>>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Connection("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<String, Entry>>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Connection("in-memory store lock poisoned".to_string()))
    }

    fn live_value<'a>(map: &'a HashMap<String, Entry>, key: &str) -> Option<&'a Value> {
        let now = Instant::now();
        map.get(key).filter(|e| e.live(now)).map(|e| &e.value)
    }

    fn purge_expired(map: &mut HashMap<String, Entry>, key: &str) {
        let now = Instant::now();
        if map.get(key).is_some_and(|e| !e.live(now)) {
            map.remove(key);
        }
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut map = self.write()?;
        Self::purge_expired(&mut map, key);

        let current = match map.get(key).map(|e| &e.value) {
            None => 0,
            Some(Value::Scalar(raw)) => raw
                .parse::<i64>()
                .map_err(|_| StoreError::NotAnInteger(key.to_string()))?,
            Some(Value::Hash(_)) => return Err(StoreError::WrongType(key.to_string())),
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| StoreError::NotAnInteger(key.to_string()))?;

        let expires_at = map.get(key).and_then(|e| e.expires_at);
        map.insert(
            key.to_string(),
            Entry {
                value: Value::Scalar(next.to_string()),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        let mut map = self.write()?;
        map.insert(
            key.to_string(),
            Entry {
                value: Value::Scalar(value.to_string()),
                expires_at: ttl.map(|t| Instant::now() + t),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let map = self.read()?;
        match Self::live_value(&map, key) {
            None => Ok(None),
            Some(Value::Scalar(v)) => Ok(Some(v.clone())),
            Some(Value::Hash(_)) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        let mut map = self.write()?;
        Self::purge_expired(&mut map, key);

        let current = match map.get(key).map(|e| &e.value) {
            None => None,
            Some(Value::Scalar(v)) => Some(v.as_str()),
            Some(Value::Hash(_)) => return Err(StoreError::WrongType(key.to_string())),
        };
        if current != expected {
            return Ok(false);
        }

        map.insert(
            key.to_string(),
            Entry {
                value: Value::Scalar(value.to_string()),
                expires_at: ttl.map(|t| Instant::now() + t),
            },
        );
        Ok(true)
    }

    async fn hset(&self, key: &str, fields: &[(&str, &str)]) -> StoreResult<()> {
        let mut map = self.write()?;
        Self::purge_expired(&mut map, key);

        let entry = map.entry(key.to_string()).or_insert_with(|| Entry {
            value: Value::Hash(HashMap::new()),
            expires_at: None,
        });
        let Value::Hash(hash) = &mut entry.value else {
            return Err(StoreError::WrongType(key.to_string()));
        };
        for (field, value) in fields {
            hash.insert((*field).to_string(), (*value).to_string());
        }
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        let map = self.read()?;
        match Self::live_value(&map, key) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(h)) => Ok(h.clone()),
            Some(Value::Scalar(_)) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn del(&self, key: &str) -> StoreResult<u64> {
        let mut map = self.write()?;
        Self::purge_expired(&mut map, key);
        Ok(u64::from(map.remove(key).is_some()))
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        let map = self.read()?;
        Ok(Self::live_value(&map, key).is_some())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let map = self.read()?;
        let now = Instant::now();
        Ok(map
            .iter()
            .filter(|(k, e)| k.starts_with(prefix) && e.live(now))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn incr_starts_at_one_and_counts_up() {
        let store = InMemoryStore::new();
        assert_eq!(store.incr("c").await.unwrap(), 1);
        assert_eq!(store.incr("c").await.unwrap(), 2);
        assert_eq!(store.get("c").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn incr_rejects_non_integer_and_hash_values() {
        let store = InMemoryStore::new();
        store.set("s", "hello", None).await.unwrap();
        assert!(matches!(store.incr("s").await, Err(StoreError::NotAnInteger(_))));

        store.hset("h", &[("a", "1")]).await.unwrap();
        assert!(matches!(store.incr("h").await, Err(StoreError::WrongType(_))));
    }

    #[tokio::test]
    async fn hset_merges_fields() {
        let store = InMemoryStore::new();
        store.hset("m", &[("id", "1"), ("content", "a")]).await.unwrap();
        store.hset("m", &[("content", "b")]).await.unwrap();

        let all = store.hgetall("m").await.unwrap();
        assert_eq!(all.get("id").map(String::as_str), Some("1"));
        assert_eq!(all.get("content").map(String::as_str), Some("b"));
    }

    #[tokio::test]
    async fn del_reports_removed_count() {
        let store = InMemoryStore::new();
        store.hset("m", &[("content", "x")]).await.unwrap();
        assert_eq!(store.del("m").await.unwrap(), 1);
        assert_eq!(store.del("m").await.unwrap(), 0);
        assert!(!store.exists("m").await.unwrap());
        assert!(store.hgetall("m").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_scalars_read_as_absent() {
        let store = InMemoryStore::new();
        store.set("j", "pending", Some(Duration::from_millis(20))).await.unwrap();
        assert_eq!(store.get("j").await.unwrap().as_deref(), Some("pending"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.get("j").await.unwrap(), None);
        assert!(!store.exists("j").await.unwrap());
        assert!(store.keys_with_prefix("j").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn keys_with_prefix_filters() {
        let store = InMemoryStore::new();
        store.hset("message:1", &[("content", "a")]).await.unwrap();
        store.hset("message:2", &[("content", "b")]).await.unwrap();
        store.incr("message_counter").await.unwrap();
        store.set("job:x", "pending", None).await.unwrap();

        let mut keys = store.keys_with_prefix("message:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["message:1".to_string(), "message:2".to_string()]);
    }

    #[tokio::test]
    async fn get_on_hash_is_wrong_type() {
        let store = InMemoryStore::new();
        store.hset("h", &[("a", "1")]).await.unwrap();
        assert!(matches!(store.get("h").await, Err(StoreError::WrongType(_))));
    }

    #[tokio::test]
    async fn compare_and_set_writes_only_on_match() {
        let store = InMemoryStore::new();
        assert!(store.compare_and_set("j", None, "pending", None).await.unwrap());
        assert!(!store.compare_and_set("j", None, "completed", None).await.unwrap());
        assert!(
            !store
                .compare_and_set("j", Some("failed:x"), "completed", None)
                .await
                .unwrap()
        );
        assert_eq!(store.get("j").await.unwrap().as_deref(), Some("pending"));

        assert!(
            store
                .compare_and_set("j", Some("pending"), "completed", None)
                .await
                .unwrap()
        );
        assert_eq!(store.get("j").await.unwrap().as_deref(), Some("completed"));
    }

    #[tokio::test]
    async fn compare_and_set_treats_expired_as_absent() {
        let store = InMemoryStore::new();
        store.set("j", "pending", Some(Duration::from_millis(20))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(
            !store
                .compare_and_set("j", Some("pending"), "completed", None)
                .await
                .unwrap()
        );
        assert!(store.compare_and_set("j", None, "completed", None).await.unwrap());
        assert_eq!(store.get("j").await.unwrap().as_deref(), Some("completed"));
    }

    #[tokio::test]
    async fn compare_and_set_on_hash_is_wrong_type() {
        let store = InMemoryStore::new();
        store.hset("h", &[("a", "1")]).await.unwrap();
        assert!(matches!(
            store.compare_and_set("h", None, "x", None).await,
            Err(StoreError::WrongType(_))
        ));
    }
}
