//! Ordered key-value storage behind the todo repository.
//!
//! # Design
//! Records live under multi-segment [`Key`]s and hold JSON documents. Keys
//! order segment by segment, so every key sharing a leading run of segments
//! sits in one contiguous range and a prefix listing is a range scan.
//!
//! Backends implement [`KvStore`]: point reads and writes plus a bounded
//! `scan`. [`list`] turns repeated scans into a lazy stream that re-reads
//! from a key cursor on every page, so no backend lock is held while the
//! consumer is between pages and a fresh call always starts over.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

/// Entries fetched per `scan` call when listing a prefix.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// A key made of ordered string segments, e.g. `["todos", "alice", "<id>"]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(Vec<String>);

impl Key {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when `prefix` is a strict leading run of this key's segments.
    /// A key is not under itself.
    pub fn is_under(&self, prefix: &Key) -> bool {
        self.0.len() > prefix.0.len() && self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// A stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: Key,
    pub value: Value,
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not serve the request.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A stored document did not match the expected shape.
    #[error("stored value could not be decoded: {0}")]
    Codec(#[from] serde_json::Error),
}

/// An ordered key-value store with atomic single-key operations.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &Key) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: Key, value: Value) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &Key) -> Result<(), StoreError>;

    /// Returns up to `limit` entries under `prefix` in key order, starting
    /// strictly after `after` when it is given.
    async fn scan(
        &self,
        prefix: &Key,
        after: Option<&Key>,
        limit: usize,
    ) -> Result<Vec<Entry>, StoreError>;
}

struct ListCursor {
    store: Arc<dyn KvStore>,
    prefix: Key,
    after: Option<Key>,
    page_size: usize,
    exhausted: bool,
}

async fn next_page(
    mut cursor: ListCursor,
) -> Result<Option<(Vec<Entry>, ListCursor)>, StoreError> {
    if cursor.exhausted {
        return Ok(None);
    }
    let page = cursor
        .store
        .scan(&cursor.prefix, cursor.after.as_ref(), cursor.page_size)
        .await?;
    let Some(last) = page.last() else {
        return Ok(None);
    };
    cursor.after = Some(last.key.clone());
    cursor.exhausted = page.len() < cursor.page_size;
    Ok(Some((page, cursor)))
}

/// Streams every entry under `prefix` in key order, `page_size` entries per
/// backend round-trip.
pub fn list(
    store: Arc<dyn KvStore>,
    prefix: Key,
    page_size: usize,
) -> impl Stream<Item = Result<Entry, StoreError>> + Send + 'static {
    let cursor = ListCursor {
        store,
        prefix,
        after: None,
        page_size: page_size.max(1),
        exhausted: false,
    };
    stream::try_unfold(cursor, next_page)
        .map_ok(|page| stream::iter(page.into_iter().map(Ok::<_, StoreError>)))
        .try_flatten()
}

/// In-process [`KvStore`] over an ordered map. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<Key, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &Key) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: Key, value: Value) -> Result<(), StoreError> {
        self.entries.write().await.insert(key, value);
        Ok(())
    }

    async fn delete(&self, key: &Key) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn scan(
        &self,
        prefix: &Key,
        after: Option<&Key>,
        limit: usize,
    ) -> Result<Vec<Entry>, StoreError> {
        let lower = match after {
            Some(after) if after > prefix => Bound::Excluded(after.clone()),
            _ => Bound::Excluded(prefix.clone()),
        };
        let entries = self.entries.read().await;
        Ok(entries
            .range((lower, Bound::Unbounded))
            .take_while(|(key, _)| key.is_under(prefix))
            .take(limit)
            .map(|(key, value)| Entry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn todo_key(tenant: &str, id: &str) -> Key {
        Key::new(["todos", tenant, id])
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (tenant, id) in [
            ("alice", "c"),
            ("alice", "a"),
            ("alice", "b"),
            ("alice0", "x"),
            ("bob", "y"),
        ] {
            store
                .set(todo_key(tenant, id), json!({ "id": id }))
                .await
                .unwrap();
        }
        store
    }

    #[test]
    fn key_is_under_requires_strict_prefix() {
        let prefix = Key::new(["todos", "alice"]);
        assert!(todo_key("alice", "1").is_under(&prefix));
        assert!(!prefix.is_under(&prefix));
        assert!(!todo_key("alice0", "1").is_under(&prefix));
        assert!(!Key::new(["todos"]).is_under(&prefix));
    }

    #[test]
    fn key_displays_segments() {
        assert_eq!(todo_key("alice", "1").to_string(), "todos/alice/1");
    }

    #[tokio::test]
    async fn set_get_delete() {
        let store = MemoryStore::new();
        let key = todo_key("alice", "1");
        assert_eq!(store.get(&key).await.unwrap(), None);

        store.set(key.clone(), json!({"title": "one"})).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(json!({"title": "one"})));

        store.set(key.clone(), json!({"title": "two"})).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(json!({"title": "two"})));
        assert_eq!(store.len().await, 1);

        store.delete(&key).await.unwrap();
        assert_eq!(store.get(&key).await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn delete_missing_key_succeeds() {
        let store = MemoryStore::new();
        store.delete(&todo_key("alice", "nope")).await.unwrap();
    }

    #[tokio::test]
    async fn scan_stays_inside_prefix_in_key_order() {
        let store = seeded().await;
        let prefix = Key::new(["todos", "alice"]);

        let entries = store.scan(&prefix, None, 10).await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.key.segments()[2].as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn scan_resumes_after_cursor() {
        let store = seeded().await;
        let prefix = Key::new(["todos", "alice"]);

        let entries = store
            .scan(&prefix, Some(&todo_key("alice", "a")), 1)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, todo_key("alice", "b"));
    }

    #[tokio::test]
    async fn scan_ignores_exact_prefix_key() {
        let store = MemoryStore::new();
        let prefix = Key::new(["todos", "alice"]);
        store.set(prefix.clone(), json!("namespace")).await.unwrap();
        store.set(todo_key("alice", "1"), json!("todo")).await.unwrap();

        let entries = store.scan(&prefix, None, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, json!("todo"));
    }

    #[tokio::test]
    async fn list_walks_every_page() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .set(todo_key("alice", &format!("{i:02}")), json!(i))
                .await
                .unwrap();
        }
        let store: Arc<dyn KvStore> = Arc::new(store);

        let values: Vec<Value> = list(store, Key::new(["todos", "alice"]), 2)
            .map_ok(|entry| entry.value)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(values, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);
    }

    #[tokio::test]
    async fn list_of_empty_prefix_is_empty() {
        let store: Arc<dyn KvStore> = Arc::new(seeded().await);
        let entries: Vec<Entry> = list(store, Key::new(["todos", "carol"]), DEFAULT_PAGE_SIZE)
            .try_collect()
            .await
            .unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn list_restarts_from_the_beginning() {
        let store: Arc<dyn KvStore> = Arc::new(seeded().await);
        let prefix = Key::new(["todos", "alice"]);

        let first: Vec<Entry> = list(store.clone(), prefix.clone(), 1)
            .try_collect()
            .await
            .unwrap();
        let second: Vec<Entry> = list(store, prefix, 1).try_collect().await.unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
    }
}
