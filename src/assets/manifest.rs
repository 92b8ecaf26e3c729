use crate::assets::disk::is_valid_tag;
use crate::Result;
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_CACHE_NAME: &str = "budget-tracker-cache-v1";
pub const DEFAULT_OFFLINE_PAGE: &str = "/offline.html";

const DEFAULT_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/login.html",
    "/register.html",
    "/dashboard.html",
    "/reports.html",
    "/settings.html",
    "/sidebar.html",
    "/styles.css",
    "/main.js",
    "/icons/notify.png",
    DEFAULT_OFFLINE_PAGE,
    "https://cdn.jsdelivr.net/npm/chart.js",
];

/// The assets precached by one cache generation.
///
/// Changing `cache_name` starts a new generation: the next activation deletes every region with
/// another name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    cache_name: String,
    assets: Vec<String>,
    offline_page: String,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
            offline_page: DEFAULT_OFFLINE_PAGE.to_string(),
        }
    }
}

impl Manifest {
    pub fn new(
        cache_name: impl Into<String>,
        assets: Vec<String>,
        offline_page: impl Into<String>,
    ) -> Result<Self> {
        let manifest = Self {
            cache_name: cache_name.into(),
            assets,
            offline_page: offline_page.into(),
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// The generation tag.
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn offline_page(&self) -> &str {
        &self.offline_page
    }

    /// Returns a copy of this manifest with another generation tag.
    pub fn with_cache_name(&self, cache_name: impl Into<String>) -> Result<Self> {
        Self::new(cache_name, self.assets.clone(), self.offline_page.clone())
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            is_valid_tag(&self.cache_name),
            "'{}' cannot be used as a cache name",
            self.cache_name
        );
        ensure!(
            self.assets.iter().any(|a| a == &self.offline_page),
            "The offline page '{}' must be one of the cached assets",
            self.offline_page
        );
        Ok(())
    }
}

/// Resolves `locator` against `origin`. Absolute URLs are returned unchanged.
pub fn resolve(origin: &Url, locator: &str) -> Result<Url> {
    origin
        .join(locator)
        .with_context(|| format!("'{locator}' is not a valid asset locator"))
}
