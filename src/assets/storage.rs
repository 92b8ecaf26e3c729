//! Cache storage: named cache regions holding request/response pairs.

use crate::assets::Response;
use crate::Result;
use anyhow::anyhow;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use url::Url;

/// A set of named cache regions. Each region maps a request URL to a stored response.
#[async_trait::async_trait]
pub trait CacheStorage: Send + Sync {
    /// Creates the region `tag` if it does not exist.
    async fn open(&self, tag: &str) -> Result<()>;

    /// The tags of all existing regions, sorted.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Deletes the region `tag`. Returns whether it existed.
    async fn delete(&self, tag: &str) -> Result<bool>;

    /// Looks up `url` in region `tag` by exact match.
    async fn lookup(&self, tag: &str, url: &Url) -> Result<Option<Response>>;

    /// Stores `response` for `url` in region `tag`, creating the region if needed.
    async fn put(&self, tag: &str, url: &Url, response: &Response) -> Result<()>;

    /// Whether the region `tag` exists.
    async fn has(&self, tag: &str) -> Result<bool> {
        Ok(self.keys().await?.iter().any(|k| k == tag))
    }
}

type Regions = BTreeMap<String, BTreeMap<String, Response>>;

/// Cache storage held in memory.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    regions: Mutex<Regions>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of entries in region `tag`, or `None` if there is no such region.
    pub fn len(&self, tag: &str) -> Result<Option<usize>> {
        Ok(self.lock()?.get(tag).map(BTreeMap::len))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Regions>> {
        self.regions.lock().map_err(|e| anyhow!("Lock poisoned: {e}"))
    }
}

#[async_trait::async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, tag: &str) -> Result<()> {
        self.lock()?.entry(tag.to_string()).or_default();
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.keys().cloned().collect())
    }

    async fn delete(&self, tag: &str) -> Result<bool> {
        Ok(self.lock()?.remove(tag).is_some())
    }

    async fn lookup(&self, tag: &str, url: &Url) -> Result<Option<Response>> {
        Ok(self
            .lock()?
            .get(tag)
            .and_then(|region| region.get(url.as_str()))
            .cloned())
    }

    async fn put(&self, tag: &str, url: &Url, response: &Response) -> Result<()> {
        self.lock()?
            .entry(tag.to_string())
            .or_default()
            .insert(url.to_string(), response.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_memory_cache_storage() {
    let storage = MemoryCacheStorage::new();
    let url = Url::parse("https://budget.example.com/styles.css").unwrap();
    let response = Response::ok("text/css", "body {}");

    storage.open("v1").await.unwrap();
    assert_eq!(storage.len("v1").unwrap(), Some(0));
    assert!(storage.lookup("v1", &url).await.unwrap().is_none());

    storage.put("v2", &url, &response).await.unwrap();
    assert_eq!(storage.keys().await.unwrap(), vec!["v1", "v2"]);
    assert_eq!(storage.lookup("v2", &url).await.unwrap(), Some(response));
    assert!(storage.has("v2").await.unwrap());

    assert!(storage.delete("v1").await.unwrap());
    assert!(!storage.delete("v1").await.unwrap());
    assert!(!storage.has("v1").await.unwrap());
}
