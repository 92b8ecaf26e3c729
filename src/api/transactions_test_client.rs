//! Implements the `TransactionService` trait in memory.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a remote service.

use crate::api::TransactionService;
use crate::model::Transaction;
use crate::Result;
use anyhow::{anyhow, bail};
use serde_json::{json, Value};
use std::sync::{Mutex, MutexGuard};

/// An in-memory transaction service that can be switched between online and offline. While
/// offline every call fails, just like an unreachable server. Calls are counted either way.
#[derive(Debug, Default)]
pub struct TestTransactionService {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
struct State {
    online: bool,
    transactions: Vec<Transaction>,
    reads: usize,
    appends: usize,
}

impl TestTransactionService {
    /// An online service holding `transactions`.
    pub fn online(transactions: Vec<Transaction>) -> Self {
        Self {
            state: Mutex::new(State {
                online: true,
                transactions,
                ..State::default()
            }),
        }
    }

    /// A service that fails every call.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn set_online(&self, online: bool) -> Result<()> {
        self.lock()?.online = online;
        Ok(())
    }

    /// The transactions the service holds.
    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.lock()?.transactions.clone())
    }

    /// The number of `read_all` calls received, including failed ones.
    pub fn reads(&self) -> Result<usize> {
        Ok(self.lock()?.reads)
    }

    /// The number of `append` calls received, including failed ones.
    pub fn appends(&self) -> Result<usize> {
        Ok(self.lock()?.appends)
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|e| anyhow!("Lock poisoned: {e}"))
    }
}

#[async_trait::async_trait]
impl TransactionService for TestTransactionService {
    async fn read_all(&self) -> Result<Vec<Transaction>> {
        let mut state = self.lock()?;
        state.reads += 1;
        if !state.online {
            bail!("The test transaction service is offline");
        }
        Ok(state.transactions.clone())
    }

    async fn append(&self, transaction: &Transaction) -> Result<Value> {
        let mut state = self.lock()?;
        state.appends += 1;
        if !state.online {
            bail!("The test transaction service is offline");
        }
        state.transactions.push(transaction.clone());
        Ok(json!({ "stored": transaction, "count": state.transactions.len() }))
    }
}
