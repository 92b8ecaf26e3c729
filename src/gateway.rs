//! The sync gateway mediates every read and write of the user's data.
//!
//! Transactions go to the remote service first. Any failure of the remote call, whatever its
//! cause, silently degrades to the durable store. There is no retry, no offline queue and no
//! later reconciliation: a transaction appended while the service is down stays local. The other
//! records (user, settings, session) only ever live in the durable store.

use crate::api::TransactionService;
use crate::model::{Settings, Transaction, User};
use crate::store::{self, Store};
use crate::Result;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use tracing::{debug, trace, warn};

/// Which path satisfied a call to `SyncGateway::append_transaction`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "response")]
pub enum Appended {
    /// The remote service accepted the transaction and answered with this response.
    Remote(Value),
    /// The remote service was unavailable. The transaction was written to the durable store only
    /// and will not be sent to the service later.
    Local,
}

impl Appended {
    pub fn is_local(&self) -> bool {
        matches!(self, Appended::Local)
    }
}

/// Which path satisfied a call to `SyncGateway::read_transactions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Remote,
    Local,
}

/// Runs `remote`. If it fails for any reason, logs the failure and runs `local` instead. Errors
/// from `local` are returned to the caller.
pub async fn remote_or_local<T, R, RF, L, LF>(what: &str, remote: R, local: L) -> Result<T>
where
    R: FnOnce() -> RF,
    RF: Future<Output = Result<T>>,
    L: FnOnce() -> LF,
    LF: Future<Output = Result<T>>,
{
    match remote().await {
        Ok(value) => {
            trace!("{what}: answered by the remote service");
            Ok(value)
        }
        Err(e) => {
            debug!("{what}: remote service unavailable, using local storage: {e:#}");
            local().await
        }
    }
}

/// Mediates access to the remote transaction service and the durable store.
pub struct SyncGateway<R: ?Sized, S: ?Sized> {
    remote: Box<R>,
    store: Box<S>,
}

impl<R, S> SyncGateway<R, S>
where
    R: TransactionService + ?Sized,
    S: Store + ?Sized,
{
    pub fn new(remote: Box<R>, store: Box<S>) -> Self {
        Self { remote, store }
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads all transactions. A successful remote answer is used as-is, without merging the local
    /// copy. Otherwise the local list is returned, or an empty list if there is none.
    pub async fn read_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.read_transactions_with_source().await?.0)
    }

    /// Like `read_transactions`, but also reports where the list came from.
    pub async fn read_transactions_with_source(&self) -> Result<(Vec<Transaction>, Source)> {
        remote_or_local(
            "read transactions",
            move || async move { Ok((self.remote.read_all().await?, Source::Remote)) },
            move || async move { Ok((self.local_transactions().await?, Source::Local)) },
        )
        .await
    }

    /// Appends a transaction. If the remote service accepts it, its response is returned.
    /// Otherwise the local list is read, extended by `transaction` and written back whole.
    pub async fn append_transaction(&self, transaction: Transaction) -> Result<Appended> {
        let record = &transaction;
        let appended = remote_or_local(
            "append transaction",
            move || async move { Ok(Appended::Remote(self.remote.append(record).await?)) },
            move || async move {
                let mut transactions = self.local_transactions().await?;
                transactions.push(record.clone());
                store::set_json(self.store(), store::TRANSACTIONS, &transactions).await?;
                Ok(Appended::Local)
            },
        )
        .await?;
        if appended.is_local() {
            warn!("The transaction was saved locally only; it will stay local");
        }
        Ok(appended)
    }

    /// The transaction list held in the durable store.
    pub async fn local_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(
            store::get_json(self.store(), store::TRANSACTIONS)
                .await?
                .unwrap_or_default(),
        )
    }

    /// The saved settings, or the defaults if none were saved.
    pub async fn load_settings(&self) -> Result<Settings> {
        Ok(store::get_json(self.store(), store::SETTINGS)
            .await?
            .unwrap_or_default())
    }

    /// Replaces the settings record.
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        store::set_json(self.store(), store::SETTINGS, settings).await
    }

    pub async fn load_user(&self) -> Result<Option<User>> {
        store::get_json(self.store(), store::USER).await
    }

    /// Replaces the user record. There is at most one user per device.
    pub async fn save_user(&self, user: &User) -> Result<()> {
        store::set_json(self.store(), store::USER, user).await
    }

    /// The email of the logged-in user, if there is a session.
    pub async fn session(&self) -> Result<Option<String>> {
        store::get_json(self.store(), store::LOGGED_IN_USER).await
    }

    pub async fn set_session(&self, email: &str) -> Result<()> {
        store::set_json(self.store(), store::LOGGED_IN_USER, email).await
    }

    pub async fn clear_session(&self) -> Result<()> {
        self.store.remove(store::LOGGED_IN_USER).await
    }

    /// Wipes everything in the durable store.
    pub async fn clear_all(&self) -> Result<()> {
        self.store.clear().await
    }

    /// Wipes the local transaction list only.
    pub async fn reset_transactions(&self) -> Result<()> {
        self.store.remove(store::TRANSACTIONS).await
    }
}
