//! Implements the `TransactionService` trait over HTTP with `reqwest`.

use crate::api::{TransactionService, TRANSACTIONS_PATH};
use crate::model::Transaction;
use crate::Result;
use anyhow::{bail, Context};
use serde_json::Value;
use tracing::trace;
use url::Url;

/// Talks to `{base}/api/transactions`. Any non-success status is an error.
#[derive(Debug, Clone)]
pub struct HttpTransactionService {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransactionService {
    /// Create a client for the service rooted at `base`, e.g. `https://budget.example.com`.
    pub fn new(base: &Url) -> Result<Self> {
        let endpoint = base
            .join(TRANSACTIONS_PATH)
            .with_context(|| format!("Unable to build the transactions URL from '{base}'"))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl TransactionService for HttpTransactionService {
    async fn read_all(&self) -> Result<Vec<Transaction>> {
        trace!("GET {}", self.endpoint);
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .context("Failed to send the request for transactions")?;

        if !response.status().is_success() {
            bail!(
                "The transaction service answered GET with status {}",
                response.status()
            );
        }

        response
            .json::<Vec<Transaction>>()
            .await
            .context("Failed to parse the transactions returned by the service")
    }

    async fn append(&self, transaction: &Transaction) -> Result<Value> {
        trace!("POST {}", self.endpoint);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(transaction)
            .send()
            .await
            .context("Failed to send the new transaction")?;

        if !response.status().is_success() {
            bail!(
                "The transaction service answered POST with status {}",
                response.status()
            );
        }

        // An empty body is a valid acknowledgment
        let body = response
            .text()
            .await
            .context("Failed to read the transaction service response")?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).context("Failed to parse the transaction service response")
    }
}

#[test]
fn test_endpoint() {
    let base = Url::parse("https://budget.example.com/app/").unwrap();
    let service = HttpTransactionService::new(&base).unwrap();
    assert_eq!(
        service.endpoint().as_str(),
        "https://budget.example.com/api/transactions"
    );
}
