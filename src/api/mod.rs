//! Clients for the remote transaction service.
//!
//! The service exposes two calls, `GET /api/transactions` and `POST /api/transactions`. It is an
//! external collaborator: this crate never requires it to be reachable.

mod transactions_client;
mod transactions_test_client;

use crate::model::Transaction;
use crate::{Config, Result};
use anyhow::bail;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

pub use transactions_client::HttpTransactionService;
pub use transactions_test_client::TestTransactionService;

/// The path of the transactions resource on the remote service.
pub const TRANSACTIONS_PATH: &str = "/api/transactions";

/// When this environment variable is set and non-empty, `Mode::from_env` returns `Mode::Testing`.
pub const TEST_MODE_ENV: &str = "BUDGET_SYNC_IN_TEST_MODE";

/// The remote store of transactions.
#[async_trait::async_trait]
pub trait TransactionService: Send + Sync {
    /// Fetch every transaction, in entry order. A successful answer is canonical.
    async fn read_all(&self) -> Result<Vec<Transaction>>;

    /// Append one transaction. Returns whatever the service answered, typically an echo of the
    /// stored record or an acknowledgment.
    async fn append(&self, transaction: &Transaction) -> Result<Value>;
}

#[async_trait::async_trait]
impl<T> TransactionService for Arc<T>
where
    T: TransactionService + ?Sized,
{
    async fn read_all(&self) -> Result<Vec<Transaction>> {
        (**self).read_all().await
    }

    async fn append(&self, transaction: &Transaction) -> Result<Value> {
        (**self).append(transaction).await
    }
}

/// Whether we talk to real services or to in-memory stand-ins.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Live,
    Testing,
}

impl Mode {
    /// `Mode::Testing` if `BUDGET_SYNC_IN_TEST_MODE` is set and non-empty, otherwise `Mode::Live`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Live,
        }
    }
}

/// A service used when no remote URL is configured. Every call fails, so all data stays local.
#[derive(Debug, Default, Clone, Copy)]
pub struct Disconnected;

#[async_trait::async_trait]
impl TransactionService for Disconnected {
    async fn read_all(&self) -> Result<Vec<Transaction>> {
        bail!("No remote transaction service is configured")
    }

    async fn append(&self, _transaction: &Transaction) -> Result<Value> {
        bail!("No remote transaction service is configured")
    }
}

/// Creates the transaction service for `config` and `mode`. In testing mode the service is an
/// in-memory stand-in that is offline, which exercises the local fallback end-to-end.
pub fn transaction_service(config: &Config, mode: Mode) -> Result<Box<dyn TransactionService>> {
    match (mode, config.api_url()) {
        (Mode::Testing, _) => {
            debug!("Using the offline test transaction service");
            Ok(Box::new(TestTransactionService::offline()))
        }
        (Mode::Live, Some(url)) => {
            debug!("Using the remote transaction service at {url}");
            Ok(Box::new(HttpTransactionService::new(url)?))
        }
        (Mode::Live, None) => {
            debug!("No api_url configured, transactions will be kept locally");
            Ok(Box::new(Disconnected))
        }
    }
}
