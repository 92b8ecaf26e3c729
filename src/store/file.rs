use crate::store::Store;
use crate::{utils, Result};
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// A `Store` persisted as a single JSON object in a file, e.g. `$BUDGET_HOME/store.json`.
///
/// Every operation reads the file, applies the change and writes the whole object back. A missing
/// file is an empty store. The mutex only orders operations within this process.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>> {
        match utils::read_bytes_if_exists(&self.path).await? {
            None => Ok(BTreeMap::new()),
            Some(bytes) => serde_json::from_slice(&bytes).with_context(|| {
                format!("The store file at {} is not valid", self.path.display())
            }),
        }
    }

    async fn save(&self, data: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("Unable to serialize the store")?;
        utils::write(&self.path, json).await
    }
}

#[async_trait::async_trait]
impl Store for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.guard.lock().await;
        let mut data = self.load().await?;
        data.insert(key.to_string(), value);
        self.save(&data).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.guard.lock().await;
        let mut data = self.load().await?;
        if data.remove(key).is_some() {
            self.save(&data).await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.guard.lock().await;
        self.save(&BTreeMap::new()).await
    }
}

#[tokio::test]
async fn test_file_store_persists() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let store = FileStore::new(&path);
    assert_eq!(store.get("user").await.unwrap(), None);
    store.set("user", "{}".to_string()).await.unwrap();
    store.set("settings", "{}".to_string()).await.unwrap();

    // A second handle on the same file sees the data
    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get("user").await.unwrap().as_deref(), Some("{}"));
    reopened.remove("user").await.unwrap();
    assert_eq!(store.get("user").await.unwrap(), None);
    assert_eq!(store.get("settings").await.unwrap().as_deref(), Some("{}"));

    store.clear().await.unwrap();
    assert_eq!(reopened.get("settings").await.unwrap(), None);
}

#[tokio::test]
async fn test_file_store_corrupt_file() {
    use tempfile::TempDir;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    utils::write(&path, "[1, 2").await.unwrap();
    let store = FileStore::new(&path);
    assert!(store.get("user").await.is_err());
}
