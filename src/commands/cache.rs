use crate::assets::{AssetCacheManager, CacheStorage, Lifecycle, Network, Request};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{utils, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// The state of the asset cache on disk.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub cache_name: String,
    pub state: Lifecycle,
    /// Every cache generation present in storage, including old ones not yet deleted.
    pub regions: Vec<String>,
}

/// The outcome of `cache_fetch`.
#[derive(Debug, Clone, Serialize)]
pub struct Fetched {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: usize,
}

/// Installs the current cache generation and activates it, deleting older generations.
pub async fn cache_update<C, N>(manager: &mut AssetCacheManager<C, N>) -> Result<Out<CacheStatus>>
where
    C: CacheStorage + ?Sized,
    N: Network + ?Sized,
{
    manager.install().await?;
    manager.activate().await?;
    let status = status(manager).await?;
    Ok(Out::new(
        format!(
            "Cached {} assets in '{}'",
            manager.manifest().assets().len(),
            status.cache_name
        ),
        status,
    ))
}

/// Reports which cache generations are present.
pub async fn cache_status<C, N>(manager: &mut AssetCacheManager<C, N>) -> Result<Out<CacheStatus>>
where
    C: CacheStorage + ?Sized,
    N: Network + ?Sized,
{
    attach(manager).await;
    let status = status(manager).await?;
    let message = if status.state == Lifecycle::Activated {
        format!("The asset cache '{}' is installed", status.cache_name)
    } else {
        format!(
            "The asset cache '{}' is not installed, run `budget cache update`",
            status.cache_name
        )
    };
    Ok(Out::new(message, status))
}

/// Requests `locator` through the asset cache. Without an installed cache the request goes
/// straight to the network.
pub async fn cache_fetch<C, N>(
    manager: &mut AssetCacheManager<C, N>,
    locator: &str,
    output: Option<&Path>,
) -> Result<Out<Fetched>>
where
    C: CacheStorage + ?Sized,
    N: Network + ?Sized,
{
    attach(manager).await;
    let url = manager.resolve(locator).pub_result(ErrorType::Validation)?;
    let response = manager.handle_fetch(&Request::get(url.clone())).await?;
    let fetched = Fetched {
        url: url.to_string(),
        status: response.status(),
        content_type: response.content_type().map(str::to_string),
        bytes: response.body().len(),
    };

    let mut message = format!("{} {url} ({} bytes)", fetched.status, fetched.bytes);
    match output {
        Some(path) => {
            utils::write(path, response.body()).await?;
            message.push_str(&format!(", written to {}", path.display()));
        }
        None => {
            if let Ok(text) = std::str::from_utf8(response.body()) {
                message.push('\n');
                message.push_str(text);
            }
        }
    }
    Ok(Out::new(message, fetched))
}

/// Re-attaches to an earlier installation if there is one.
async fn attach<C, N>(manager: &mut AssetCacheManager<C, N>)
where
    C: CacheStorage + ?Sized,
    N: Network + ?Sized,
{
    if let Err(e) = manager.restore().await {
        debug!("{e:#}");
        warn!("The asset cache is not installed, requests go straight to the network");
    }
}

async fn status<C, N>(manager: &AssetCacheManager<C, N>) -> Result<CacheStatus>
where
    C: CacheStorage + ?Sized,
    N: Network + ?Sized,
{
    Ok(CacheStatus {
        cache_name: manager.manifest().cache_name().to_string(),
        state: manager.state(),
        regions: manager
            .storage()
            .keys()
            .await
            .pub_result(ErrorType::Cache)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{DiskCacheStorage, Manifest, Response, TestNetwork};
    use tempfile::TempDir;
    use url::Url;

    fn manager(root: &Path, tag: &str) -> AssetCacheManager<DiskCacheStorage, TestNetwork> {
        let manifest = Manifest::new(
            tag,
            vec!["/".to_string(), "/offline.html".to_string()],
            "/offline.html",
        )
        .unwrap();
        let network = TestNetwork::new()
            .with("http://localhost:3000/", Response::ok("text/html", "home"))
            .unwrap()
            .with(
                "http://localhost:3000/offline.html",
                Response::ok("text/html", "offline"),
            )
            .unwrap();
        AssetCacheManager::new(
            Url::parse("http://localhost:3000").unwrap(),
            manifest,
            Box::new(DiskCacheStorage::new(root)),
            Box::new(network),
        )
    }

    #[tokio::test]
    async fn test_update_then_fetch_offline() {
        let dir = TempDir::new().unwrap();
        let out = cache_update(&mut manager(dir.path(), "v1")).await.unwrap();
        assert_eq!(out.structure().unwrap().regions, vec!["v1"]);

        // A later run starts from scratch and finds the installation on disk
        let mut later = manager(dir.path(), "v1");
        later.network().set_online(false).unwrap();
        let out = cache_fetch(&mut later, "/", None).await.unwrap();
        assert!(out.message().ends_with("home"));
        let out = cache_fetch(&mut later, "/settings.html", None).await.unwrap();
        assert!(out.message().ends_with("offline"));
    }

    #[tokio::test]
    async fn test_new_generation_replaces_old() {
        let dir = TempDir::new().unwrap();
        cache_update(&mut manager(dir.path(), "v1")).await.unwrap();
        let out = cache_update(&mut manager(dir.path(), "v2")).await.unwrap();
        assert_eq!(out.structure().unwrap().regions, vec!["v2"]);
    }

    #[tokio::test]
    async fn test_status_not_installed() {
        let dir = TempDir::new().unwrap();
        let out = cache_status(&mut manager(dir.path(), "v1")).await.unwrap();
        let status = out.structure().unwrap();
        assert_eq!(status.state, Lifecycle::Parsed);
        assert!(status.regions.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_to_file() {
        let dir = TempDir::new().unwrap();
        let mut m = manager(&dir.path().join(".cache"), "v1");
        cache_update(&mut m).await.unwrap();
        let path = dir.path().join("index.html");
        let out = cache_fetch(&mut m, "/", Some(&path)).await.unwrap();
        assert_eq!(out.structure().unwrap().bytes, 4);
        assert_eq!(utils::read(&path).await.unwrap(), "home");
    }
}
