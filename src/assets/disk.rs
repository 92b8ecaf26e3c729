//! Cache storage on disk.
//!
//! Layout under the root directory (e.g. `$BUDGET_HOME/.cache`):
//!
//! ```text
//! <tag>/<sha256 of url>.json   status, content type and url
//! <tag>/<sha256 of url>.body   response body
//! ```

use crate::assets::{CacheStorage, Response};
use crate::{utils, Result};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use url::Url;

/// Cache regions stored as directories, one per generation tag.
#[derive(Debug, Clone)]
pub struct DiskCacheStorage {
    root: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    url: String,
    #[serde(flatten)]
    response: Response,
}

impl DiskCacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn region(&self, tag: &str) -> Result<PathBuf> {
        ensure!(is_valid_tag(tag), "'{tag}' cannot be used as a cache name");
        Ok(self.root.join(tag))
    }

    fn entry_paths(&self, tag: &str, url: &Url) -> Result<(PathBuf, PathBuf)> {
        let region = self.region(tag)?;
        let key = url_key(url);
        Ok((
            region.join(format!("{key}.json")),
            region.join(format!("{key}.body")),
        ))
    }
}

/// A cache name must be usable as a single directory name.
pub(crate) fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty()
        && tag != "."
        && tag != ".."
        && tag
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// SHA256 hex of the URL, for stable fixed-length file names.
fn url_key(url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait::async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, tag: &str) -> Result<()> {
        utils::make_dir(self.region(tag)?).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        utils::subdirectories(&self.root).await
    }

    async fn delete(&self, tag: &str) -> Result<bool> {
        let region = self.region(tag)?;
        let existed = region.is_dir();
        utils::remove_dir(&region).await?;
        Ok(existed)
    }

    async fn lookup(&self, tag: &str, url: &Url) -> Result<Option<Response>> {
        let (meta_path, body_path) = self.entry_paths(tag, url)?;
        let meta = match utils::read_bytes_if_exists(&meta_path).await? {
            None => return Ok(None),
            Some(bytes) => bytes,
        };
        let entry: Entry = serde_json::from_slice(&meta)
            .with_context(|| format!("Cache entry {} is not valid", meta_path.display()))?;
        if entry.url != url.as_str() {
            return Ok(None);
        }
        let body = utils::read_bytes_if_exists(&body_path)
            .await?
            .with_context(|| format!("Cache entry body {} is missing", body_path.display()))?;
        Ok(Some(entry.response.with_body(body)))
    }

    async fn put(&self, tag: &str, url: &Url, response: &Response) -> Result<()> {
        self.open(tag).await?;
        let (meta_path, body_path) = self.entry_paths(tag, url)?;
        let entry = Entry {
            url: url.to_string(),
            response: response.clone(),
        };
        let meta = serde_json::to_vec_pretty(&entry).context("Unable to serialize cache entry")?;
        // Body first, so a readable entry always has its body
        utils::write(&body_path, response.body()).await?;
        utils::write(&meta_path, meta).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_valid_tags() {
        assert!(is_valid_tag("budget-tracker-cache-v1"));
        assert!(is_valid_tag("v1.2_b"));
        assert!(!is_valid_tag(""));
        assert!(!is_valid_tag(".."));
        assert!(!is_valid_tag("a/b"));
        assert!(!is_valid_tag("v 1"));
    }

    #[tokio::test]
    async fn test_disk_cache_storage() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path().join(".cache"));
        assert!(storage.keys().await.unwrap().is_empty());

        let url = Url::parse("https://budget.example.com/main.js").unwrap();
        let response = Response::ok("text/javascript", "console.log(1)");
        storage.open("v1").await.unwrap();
        storage.put("v2", &url, &response).await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["v1", "v2"]);

        let found = storage.lookup("v2", &url).await.unwrap().unwrap();
        assert_eq!(found, response);
        assert_eq!(found.body(), b"console.log(1)");
        assert!(storage.lookup("v1", &url).await.unwrap().is_none());

        assert!(storage.delete("v1").await.unwrap());
        assert!(!storage.delete("v1").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["v2"]);
    }

    #[tokio::test]
    async fn test_disk_cache_rejects_bad_tag() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        assert!(storage.open("../escape").await.is_err());
    }
}
