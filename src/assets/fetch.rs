use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

/// An outgoing request seen by the asset cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    url: Url,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Only `GET` requests are looked up in, or stored into, a cache region.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET
    }
}

/// A response, either from the network or from a cache region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_type: Option<String>,
    #[serde(skip)]
    body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: Option<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    /// A `200` response with the given content type and body.
    pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, Some(content_type.to_string()), body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is in the `2xx` range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }
}

#[test]
fn test_response_is_ok() {
    assert!(Response::ok("text/html", "hi").is_ok());
    assert!(Response::new(204, None, Vec::new()).is_ok());
    assert!(!Response::new(404, None, Vec::new()).is_ok());
    assert!(!Response::new(301, None, Vec::new()).is_ok());
}

#[test]
fn test_request_is_cacheable() {
    let url = Url::parse("https://budget.example.com/index.html").unwrap();
    assert!(Request::get(url.clone()).is_cacheable());
    assert!(!Request::new(Method::POST, url).is_cacheable());
}
