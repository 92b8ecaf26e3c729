use crate::store::Store;
use crate::Result;
use anyhow::anyhow;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// A `Store` that lives only in memory. Used by tests and anywhere persistence is not wanted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a `MemoryStore` seeded with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// The keys currently present, in sorted order.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.data.lock().map_err(|e| anyhow!("Lock poisoned: {e}"))
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }
}

#[tokio::test]
async fn test_memory_store() {
    let store = MemoryStore::with_entries([("a", "1"), ("b", "2")]);
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
    store.set("a", "3".to_string()).await.unwrap();
    assert_eq!(store.get("a").await.unwrap().as_deref(), Some("3"));
    store.remove("a").await.unwrap();
    store.remove("a").await.unwrap();
    assert_eq!(store.get("a").await.unwrap(), None);
    assert_eq!(store.keys().unwrap(), vec!["b"]);
    store.clear().await.unwrap();
    assert!(store.keys().unwrap().is_empty());
}
