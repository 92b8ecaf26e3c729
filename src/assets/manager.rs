use crate::assets::manifest::resolve;
use crate::assets::{CacheStorage, Manifest, Network, Request, Response};
use crate::error::{ErrorType, IntoResult};
use crate::Result;
use anyhow::{anyhow, bail, ensure};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};
use url::Url;

/// The lifecycle of an asset cache manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// The install failed. Another install may be attempted.
    Redundant,
}

serde_plain::derive_display_from_serialize!(Lifecycle);

/// Precaches the assets of a `Manifest`, evicts old cache generations, and answers requests
/// cache-first with an offline fallback.
pub struct AssetCacheManager<C: ?Sized, N: ?Sized> {
    origin: Url,
    manifest: Manifest,
    state: Lifecycle,
    storage: Box<C>,
    network: Box<N>,
}

impl<C, N> AssetCacheManager<C, N>
where
    C: CacheStorage + ?Sized,
    N: Network + ?Sized,
{
    pub fn new(origin: Url, manifest: Manifest, storage: Box<C>, network: Box<N>) -> Self {
        Self {
            origin,
            manifest,
            state: Lifecycle::Parsed,
            storage,
            network,
        }
    }

    pub fn state(&self) -> Lifecycle {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == Lifecycle::Activated
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn storage(&self) -> &C {
        &self.storage
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Resolves a locator such as `/index.html` against the origin.
    pub fn resolve(&self, locator: &str) -> Result<Url> {
        resolve(&self.origin, locator)
    }

    /// Fetches every asset in the manifest and stores them in the region named by the cache
    /// name. The install is all or nothing: if any fetch fails or answers with a non-2xx status,
    /// nothing is stored and the state becomes `Redundant`.
    pub async fn install(&mut self) -> Result<()> {
        ensure!(
            matches!(self.state, Lifecycle::Parsed | Lifecycle::Redundant),
            "Cannot install the asset cache while it is {}",
            self.state
        );
        self.state = Lifecycle::Installing;
        match self.precache().await {
            Ok(count) => {
                self.state = Lifecycle::Installed;
                info!(
                    "Installed {count} assets in cache '{}'",
                    self.manifest.cache_name()
                );
                Ok(())
            }
            Err(e) => {
                self.state = Lifecycle::Redundant;
                Err(e).pub_result(ErrorType::Cache)
            }
        }
    }

    async fn precache(&self) -> Result<usize> {
        let mut responses = Vec::with_capacity(self.manifest.assets().len());
        for locator in self.manifest.assets() {
            let url = self.resolve(locator)?;
            let response = self.network.fetch(&Request::get(url.clone())).await?;
            if !response.is_ok() {
                bail!(
                    "Unable to cache {url}, the server answered {}",
                    response.status()
                );
            }
            trace!("Fetched {url} for precaching");
            responses.push((url, response));
        }
        let tag = self.manifest.cache_name();
        self.storage.open(tag).await?;
        for (url, response) in &responses {
            self.storage.put(tag, url, response).await?;
        }
        Ok(responses.len())
    }

    /// Deletes every cache region whose name differs from the current one and starts
    /// intercepting requests. Activating an already active manager only repeats the cleanup.
    pub async fn activate(&mut self) -> Result<()> {
        ensure!(
            matches!(self.state, Lifecycle::Installed | Lifecycle::Activated),
            "Cannot activate the asset cache while it is {}",
            self.state
        );
        self.state = Lifecycle::Activating;
        let current = self.manifest.cache_name().to_string();
        let cleanup = self.delete_other_regions(&current).await;
        // The current region is intact even if the cleanup failed part way
        self.state = Lifecycle::Activated;
        cleanup.pub_result(ErrorType::Cache)
    }

    async fn delete_other_regions(&self, current: &str) -> Result<()> {
        for tag in self.storage.keys().await? {
            if tag != current {
                self.storage.delete(&tag).await?;
                info!("Deleted old cache '{tag}'");
            }
        }
        Ok(())
    }

    /// Re-attaches to an earlier installation. The region for the current cache name must exist.
    pub async fn restore(&mut self) -> Result<()> {
        let tag = self.manifest.cache_name();
        let exists = self.storage.has(tag).await.pub_result(ErrorType::Cache)?;
        if !exists {
            return Err(anyhow!(
                "The asset cache '{tag}' is not installed, run `budget cache update`"
            ))
            .pub_result(ErrorType::Cache);
        }
        self.state = Lifecycle::Activated;
        debug!("Restored asset cache '{tag}'");
        Ok(())
    }

    /// Answers `request`.
    ///
    /// While not active, the request goes straight to the network. While active:
    /// - a cached response is returned without touching the network,
    /// - otherwise the network answers, and a 2xx answer to a same-origin `GET` is cached,
    /// - if the network fails, the cached offline page is returned.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Response> {
        if !self.is_active() {
            return self.network.fetch(request).await.pub_result(ErrorType::Request);
        }
        let tag = self.manifest.cache_name();
        if request.is_cacheable() {
            let cached = self
                .storage
                .lookup(tag, request.url())
                .await
                .pub_result(ErrorType::Cache)?;
            if let Some(response) = cached {
                trace!("Cache hit for {}", request.url());
                return Ok(response);
            }
        }
        match self.network.fetch(request).await {
            Ok(response) => {
                if self.should_store(request, &response) {
                    if let Err(e) = self.storage.put(tag, request.url(), &response).await {
                        warn!("Unable to cache {}: {e:#}", request.url());
                    }
                }
                Ok(response)
            }
            Err(e) => {
                debug!("Network unavailable for {}: {e:#}", request.url());
                self.offline_fallback().await
            }
        }
    }

    fn should_store(&self, request: &Request, response: &Response) -> bool {
        request.is_cacheable()
            && response.is_ok()
            && request.url().origin() == self.origin.origin()
    }

    async fn offline_fallback(&self) -> Result<Response> {
        let url = self.resolve(self.manifest.offline_page())?;
        let cached = self
            .storage
            .lookup(self.manifest.cache_name(), &url)
            .await
            .pub_result(ErrorType::Cache)?;
        match cached {
            Some(response) => Ok(response),
            None => Err(anyhow!(
                "The network is unavailable and the offline page {url} is not cached"
            ))
            .pub_result(ErrorType::Request),
        }
    }
}
