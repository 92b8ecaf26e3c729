//! The asset cache keeps the application shell available offline.
//!
//! An `AssetCacheManager` precaches the assets listed in a `Manifest` into a cache region named by
//! the manifest's cache name, deletes the regions of older generations when it activates, and then
//! answers requests cache-first, falling back to the cached offline page when the network is
//! unreachable. Storage and network are injected so the whole lifecycle runs in memory in tests.

mod disk;
mod fetch;
mod manager;
mod manifest;
mod network;
mod storage;

pub use disk::DiskCacheStorage;
pub use fetch::{Request, Response};
pub use manager::{AssetCacheManager, Lifecycle};
pub use manifest::{resolve, Manifest, DEFAULT_CACHE_NAME, DEFAULT_OFFLINE_PAGE};
pub use network::{HttpNetwork, Network, TestNetwork};
pub use storage::{CacheStorage, MemoryCacheStorage};

use crate::api::Mode;
use crate::Config;

/// The asset cache used by the CLI: regions on disk under the home directory, and either the real
/// network or, in test mode, an offline stand-in.
pub type DynAssetCacheManager = AssetCacheManager<dyn CacheStorage, dyn Network>;

/// Builds the asset cache manager for `config`. The manager starts in the `Parsed` state.
pub fn asset_cache(config: &Config, mode: Mode) -> DynAssetCacheManager {
    let network: Box<dyn Network> = match mode {
        Mode::Live => Box::new(HttpNetwork::new()),
        Mode::Testing => Box::new(TestNetwork::offline()),
    };
    let storage: Box<dyn CacheStorage> = Box::new(DiskCacheStorage::new(config.cache_dir()));
    AssetCacheManager::new(
        config.origin().clone(),
        config.manifest().clone(),
        storage,
        network,
    )
}
