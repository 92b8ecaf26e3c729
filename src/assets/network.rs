//! The network seen by the asset cache.

use crate::assets::{Request, Response};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use reqwest::header::CONTENT_TYPE;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::trace;

#[async_trait::async_trait]
pub trait Network: Send + Sync {
    /// Performs `request`. An `Err` means the network could not be reached at all. HTTP error
    /// statuses are returned as `Ok` responses.
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Fetches over HTTP.
#[derive(Debug, Clone, Default)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        trace!("{} {}", request.method(), request.url());
        let response = self
            .client
            .request(request.method().clone(), request.url().clone())
            .send()
            .await
            .with_context(|| format!("Unable to fetch {}", request.url()))?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Unable to read the body of {}", request.url()))?;
        Ok(Response::new(status, content_type, body.to_vec()))
    }
}

/// A scripted network for tests. URLs without a route answer `404`. While offline every fetch
/// fails. Calls are counted either way.
#[derive(Debug)]
pub struct TestNetwork {
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    online: bool,
    routes: HashMap<String, Response>,
    calls: Vec<String>,
}

impl Default for TestNetwork {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                online: true,
                routes: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }
}

impl TestNetwork {
    /// An online network with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A network that fails every fetch.
    pub fn offline() -> Self {
        Self {
            state: Mutex::new(State {
                online: false,
                routes: HashMap::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Adds a route answering `url` with `response`.
    pub fn with(self, url: &str, response: Response) -> Result<Self> {
        self.route(url, response)?;
        Ok(self)
    }

    pub fn route(&self, url: &str, response: Response) -> Result<()> {
        self.lock()?.routes.insert(url.to_string(), response);
        Ok(())
    }

    pub fn set_online(&self, online: bool) -> Result<()> {
        self.lock()?.online = online;
        Ok(())
    }

    /// The number of fetches received, including failed ones.
    pub fn calls(&self) -> Result<usize> {
        Ok(self.lock()?.calls.len())
    }

    /// The URLs fetched, in order.
    pub fn fetched(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.calls.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state.lock().map_err(|e| anyhow!("Lock poisoned: {e}"))
    }
}

#[async_trait::async_trait]
impl Network for TestNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let mut state = self.lock()?;
        let url = request.url().to_string();
        state.calls.push(url.clone());
        if !state.online {
            bail!("The test network is offline, unable to fetch {url}");
        }
        Ok(state
            .routes
            .get(&url)
            .cloned()
            .unwrap_or_else(|| Response::new(404, None, Vec::new())))
    }
}

#[tokio::test]
async fn test_test_network() {
    let url = url::Url::parse("https://budget.example.com/a").unwrap();
    let network = TestNetwork::new()
        .with(url.as_str(), Response::ok("text/plain", "a"))
        .unwrap();
    let request = Request::get(url);
    assert_eq!(network.fetch(&request).await.unwrap().body(), b"a");

    let missing = Request::get(url::Url::parse("https://budget.example.com/b").unwrap());
    assert_eq!(network.fetch(&missing).await.unwrap().status(), 404);

    network.set_online(false).unwrap();
    assert!(network.fetch(&request).await.is_err());
    assert_eq!(network.calls().unwrap(), 3);
}
