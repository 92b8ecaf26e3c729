//! Configuration file handling.
//!
//! The configuration file is stored at `$BUDGET_HOME/config.json` and contains the URL of the
//! remote transaction service, the origin the application is served from, the asset cache
//! manifest and the notification permission.

use crate::assets::Manifest;
use crate::notify::Permission;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

const APP_NAME: &str = "budget";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const STORE_JSON: &str = "store.json";
const CACHE: &str = ".cache";

/// The origin used when `init` is not given one.
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BUDGET_HOME` and from there it loads `$BUDGET_HOME/config.json`. It provides
/// paths to the other items that are expected in a certain location within the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory and an initial `config.json` with default settings.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/budget`
    /// - `api_url` - The base URL of the remote transaction service. Without one, all
    ///   transactions are kept locally.
    /// - `origin` - The origin the application assets are served from.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists or any file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        api_url: Option<Url>,
        origin: Url,
    ) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the budget home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }
        utils::make_dir(root.join(CACHE)).await?;

        let config_file = ConfigFile::new(api_url, origin);
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - return the loaded configuration object
    pub async fn load(budget_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = budget_home.into();
        if !maybe_relative.is_dir() {
            bail!(
                "The budget home directory is missing '{}', run `budget init`",
                maybe_relative.display()
            )
        }
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The durable store, `$BUDGET_HOME/store.json`.
    pub fn store_path(&self) -> PathBuf {
        self.root.join(STORE_JSON)
    }

    /// The asset cache regions, `$BUDGET_HOME/.cache`.
    pub fn cache_dir(&self) -> PathBuf {
        self.root.join(CACHE)
    }

    pub fn api_url(&self) -> Option<&Url> {
        self.config_file.api_url.as_ref()
    }

    pub fn origin(&self) -> &Url {
        &self.config_file.origin
    }

    pub fn manifest(&self) -> &Manifest {
        &self.config_file.cache
    }

    pub fn notification_permission(&self) -> Permission {
        self.config_file.notification_permission
    }

    /// Records the answer to a notification permission request in `config.json`.
    pub async fn set_notification_permission(&mut self, permission: Permission) -> Result<()> {
        self.config_file.notification_permission = permission;
        self.config_file.save(&self.config_path).await
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "budget",
///   "config_version": 1,
///   "api_url": "https://budget.example.com",
///   "origin": "https://budget.example.com/",
///   "cache": {
///     "cache_name": "budget-tracker-cache-v1",
///     "assets": ["/", "/index.html", "/offline.html"],
///     "offline_page": "/offline.html"
///   },
///   "notification_permission": "default"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "budget"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the remote transaction service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_url: Option<Url>,

    /// The origin the application is served from. Requests to other origins are never cached.
    origin: Url,

    /// The assets to precache and the name of the current cache generation
    #[serde(default)]
    cache: Manifest,

    /// The answer to the last notification permission request
    #[serde(default)]
    notification_permission: Permission,
}

impl ConfigFile {
    fn new(api_url: Option<Url>, origin: Url) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url,
            origin,
            cache: Manifest::default(),
            notification_permission: Permission::Default,
        }
    }

    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or it is not a budget config
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        config
            .cache
            .validate()
            .with_context(|| format!("Invalid cache manifest in {}", path.display()))?;

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn default_origin() -> Url {
        Url::parse(DEFAULT_ORIGIN).unwrap()
    }

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("budget_home");
        let api_url = Url::parse("https://api.example.com").unwrap();
        let origin = Url::parse("https://budget.example.com").unwrap();

        let config = Config::create(&home_dir, Some(api_url.clone()), origin.clone())
            .await
            .unwrap();

        assert_eq!(Some(&api_url), config.api_url());
        assert_eq!(&origin, config.origin());
        assert_eq!(config.manifest(), &Manifest::default());
        assert_eq!(config.notification_permission(), Permission::Default);
        assert!(config.config_path().is_file());
        assert!(config.cache_dir().is_dir());
        assert!(!config.store_path().exists());
    }

    #[tokio::test]
    async fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), None, default_origin())
            .await
            .unwrap();
        let e = Config::create(dir.path(), None, default_origin())
            .await
            .unwrap_err();
        assert!(e.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_config_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), None, default_origin())
            .await
            .unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(created.root(), loaded.root());
        assert_eq!(loaded.api_url(), None);
        assert_eq!(loaded.origin().as_str(), "http://localhost:3000/");
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let e = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(e.to_string().contains("budget init"));
    }

    #[tokio::test]
    async fn test_notification_permission_is_saved() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::create(dir.path(), None, default_origin())
            .await
            .unwrap();
        config
            .set_notification_permission(Permission::Denied)
            .await
            .unwrap();
        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.notification_permission(), Permission::Denied);
    }

    #[tokio::test]
    async fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "budget",
            "config_version": 1,
            "origin": "https://budget.example.com"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let config = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(config.api_url, None);
        assert_eq!(config.cache, Manifest::default());
        assert_eq!(config.notification_permission, Permission::Default);
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "origin": "https://budget.example.com"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "budget",
            "config_version": 1,
            "origin": "https://budget.example.com",
            "cache": { "cache_name": "v1", "assets": ["/"], "offline_page": "/offline.html" }
        }"#;
        utils::write(&config_path, json).await.unwrap();
        assert!(ConfigFile::load(&config_path).await.is_err());
    }

    #[test]
    fn test_config_file_serialization_omits_api_url() {
        let json = serde_json::to_string(&ConfigFile::new(None, default_origin())).unwrap();
        assert!(!json.contains("api_url"));
        assert!(json.contains("budget-tracker-cache-v1"));
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let t = TempDir::new().unwrap();
        let path = t.path().join("file.json");
        let mut original = ConfigFile::new(
            Some(Url::parse("https://api.example.com").unwrap()),
            default_origin(),
        );
        original.notification_permission = Permission::Granted;
        original.save(&path).await.unwrap();
        assert_eq!(original, ConfigFile::load(&path).await.unwrap());
    }
}
