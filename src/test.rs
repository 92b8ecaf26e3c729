//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::api::TestTransactionService;
use crate::commands::{self, App};
use crate::gateway::SyncGateway;
use crate::notify::{Permission, RecordingNotifier};
use crate::store::FileStore;
use crate::Config;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;

pub const TEST_NAME: &str = "Test User";
pub const TEST_EMAIL: &str = "test@example.com";
pub const TEST_PASSWORD: &str = "password";

/// Test environment that sets up a budget home directory with a Config and an `App` whose remote
/// service is offline. Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    app: App,
    remote: Arc<TestTransactionService>,
    notifier: Arc<RecordingNotifier>,
}

impl TestEnv {
    /// Notification permission has not been asked for yet, and will be granted when it is.
    pub async fn new() -> Self {
        Self::with_permission(Permission::Default, Permission::Granted).await
    }

    /// A test environment with a registered and logged in user.
    pub async fn logged_in() -> Self {
        let env = Self::new().await;
        env.login().await;
        env
    }

    pub async fn with_permission(permission: Permission, answer: Permission) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("budget");
        let config = Config::create(&root, None, Url::parse("http://localhost:3000").unwrap())
            .await
            .unwrap();

        let remote = Arc::new(TestTransactionService::offline());
        let notifier = Arc::new(RecordingNotifier::new(permission, answer));
        let gateway = SyncGateway::new(
            Box::new(remote.clone()) as Box<dyn crate::api::TransactionService>,
            Box::new(FileStore::new(config.store_path())) as Box<dyn crate::store::Store>,
        );
        let app = App::with_parts(config, gateway, Box::new(notifier.clone()));

        Self {
            _temp_dir: temp_dir,
            app,
            remote,
            notifier,
        }
    }

    /// Registers the test user and logs in.
    pub async fn login(&self) {
        commands::register(&self.app, TEST_NAME, TEST_EMAIL, TEST_PASSWORD)
            .await
            .unwrap();
        commands::login(&self.app, TEST_EMAIL, TEST_PASSWORD)
            .await
            .unwrap();
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn config(&self) -> &Config {
        self.app.config()
    }

    /// The remote service. It starts offline.
    pub fn remote(&self) -> &TestTransactionService {
        &self.remote
    }

    pub fn notifier(&self) -> &RecordingNotifier {
        &self.notifier
    }
}

#[tokio::test]
async fn test_env_uses_home_store() {
    let env = TestEnv::logged_in().await;
    assert!(env.config().store_path().is_file());
    assert_eq!(env.remote().appends().unwrap(), 0);
}
