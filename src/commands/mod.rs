//! Command handlers for the budget CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod account;
mod cache;
mod data;
mod init;
mod settings;
mod transactions;

use crate::api::{self, Mode, TransactionService};
use crate::error::{ErrorType, IntoResult};
use crate::gateway::SyncGateway;
use crate::notify::{LogNotifier, Notifier};
use crate::store::{FileStore, Store};
use crate::{Config, Result};
use anyhow::anyhow;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use account::{login, logout, register};
pub use cache::{cache_fetch, cache_status, cache_update, CacheStatus, Fetched};
pub use data::{clear, reset};
pub use init::init;
pub use settings::settings;
pub use transactions::{add, categories, dashboard, report, Categories};

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// The gateway used by commands, with the remote service and store chosen at runtime.
pub type Gateway = SyncGateway<dyn TransactionService, dyn Store>;

/// What the account and data commands operate on: the gateway to the user's data and the
/// notifier for post-write notifications.
pub struct App {
    config: Config,
    gateway: Gateway,
    notifier: Box<dyn Notifier>,
}

impl App {
    /// Builds the app for a loaded `config`: a `FileStore` at `$BUDGET_HOME/store.json`, the
    /// transaction service chosen by `mode`, and a `LogNotifier`.
    pub fn new(config: Config, mode: Mode) -> Result<Self> {
        let remote = api::transaction_service(&config, mode).pub_result(ErrorType::Config)?;
        let store: Box<dyn Store> = Box::new(FileStore::new(config.store_path()));
        let notifier = Box::new(LogNotifier::new(config.clone()));
        Ok(Self::with_parts(
            config,
            SyncGateway::new(remote, store),
            notifier,
        ))
    }

    pub fn with_parts(config: Config, gateway: Gateway, notifier: Box<dyn Notifier>) -> Self {
        Self {
            config,
            gateway,
            notifier,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// The email of the logged-in user. Fails if nobody is logged in.
    pub(crate) async fn require_session(&self) -> Result<String> {
        match self.gateway.session().await.pub_result(ErrorType::Storage)? {
            Some(email) => Ok(email),
            None => Err(anyhow!("Please log in first, run `budget login`"))
                .pub_result(ErrorType::Validation),
        }
    }
}
