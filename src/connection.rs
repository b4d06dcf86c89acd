//! HTTP plumbing shared by every resource operation.

use crate::error::{ApiError, O3vError, Result};
use lazy_static::lazy_static;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::ops::RangeInclusive;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api-beta.op3nvoice.com";
pub const API_VERSION: &str = "v1";
pub const LIB_NAME: &str = "op3nvoice-rust";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const SUCCESS_STATUS: RangeInclusive<u16> = 200..=202;
const NO_CONTENT_STATUS: u16 = 204;

lazy_static! {
    static ref USER_AGENT_STRING: String = format!(
        "{}/{}/{}",
        LIB_NAME,
        env!("CARGO_PKG_VERSION"),
        env!("O3V_RUSTC_VERSION")
    );
}

/// The User-Agent sent with every request: library name, library version and
/// the rustc version the library was built with.
pub fn user_agent() -> &'static str {
    USER_AGENT_STRING.as_str()
}

/// Ordered request parameters, sent as a query string for GET and as a
/// form-urlencoded body for everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn new() -> Self {
        Fields(Vec::new())
    }

    /// Sets `key` to `value`, replacing any existing values for `key` in place.
    pub fn insert(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();

        match self.0.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.0[index].1 = value;
                let mut seen = false;
                self.0.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.0.push((key.to_string(), value)),
        }
    }

    /// Sets `key` only when a value was supplied.
    pub fn insert_opt<T: ToString>(&mut self, key: &str, value: Option<T>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.0.retain(|(k, _)| k != key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Form-urlencodes the fields in order.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Fields(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Status code and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    /// Accepts 200 through 202 and decodes the body.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        if !SUCCESS_STATUS.contains(&self.status) {
            return Err(O3vError::Api(ApiError::new(self.status, self.body)));
        }

        serde_json::from_str(&self.body).map_err(|e| O3vError::data(&self.body, e))
    }

    /// Accepts exactly 204.
    pub fn into_no_content(self) -> Result<()> {
        if self.status != NO_CONTENT_STATUS {
            return Err(O3vError::Api(ApiError::new(self.status, self.body)));
        }

        Ok(())
    }
}

/// Holds the API key and issues requests against the API host.
///
/// Every request uses a freshly built HTTP client with idle pooling disabled,
/// so no connection outlives the call that opened it. Each caller owns its
/// own `Connection`; share one across tasks only behind a lock.
#[derive(Debug, Clone)]
pub struct Connection {
    key: Option<String>,
    base_url: Url,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    /// A connection to the public API host with no key set.
    pub fn new() -> Connection {
        Connection {
            key: None,
            // Constant, always parses
            base_url: Url::parse(DEFAULT_API_URL).unwrap(),
        }
    }

    pub fn with_key(key: impl Into<String>) -> Connection {
        let mut connection = Connection::new();
        connection.set_key(key);
        connection
    }

    /// A connection to another host, e.g. a staging server or a mock.
    pub fn with_base_url(base_url: &str) -> Result<Connection> {
        let base_url = Url::parse(base_url)
            .map_err(|e| O3vError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(O3vError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                base_url
            )));
        }

        Ok(Connection {
            key: None,
            base_url,
        })
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = Some(key.into());
    }

    /// The stored key; an empty key counts as no key.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Canonical path of a top level resource, e.g. `/v1/bundles`.
    pub fn resource_path(resource: &str) -> String {
        format!("/{}/{}", API_VERSION, resource)
    }

    pub async fn get(&self, path: &str, data: &Fields) -> Result<RawResponse> {
        self.send(Method::GET, path, data).await
    }

    pub async fn post(&self, path: &str, data: &Fields) -> Result<RawResponse> {
        self.send(Method::POST, path, data).await
    }

    pub async fn put(&self, path: &str, data: &Fields) -> Result<RawResponse> {
        self.send(Method::PUT, path, data).await
    }

    pub async fn delete(&self, path: &str, data: &Fields) -> Result<RawResponse> {
        self.send(Method::DELETE, path, data).await
    }

    /// Resolves `path` against the base URL, appending `data` as query
    /// parameters after any already present in `path`.
    ///
    /// Absolute hrefs are accepted only when they point at the base URL's
    /// origin, so the API key is never sent to another host.
    pub(crate) fn request_url(&self, path: &str, data: &Fields) -> Result<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| O3vError::InvalidUrl(format!("{}: {}", path, e)))?;

        if url.origin() != self.base_url.origin() {
            return Err(O3vError::InvalidArgument(format!(
                "href {} is not on the API host {}",
                path,
                self.base_url.origin().ascii_serialization()
            )));
        }

        if !data.is_empty() {
            url.query_pairs_mut().extend_pairs(data.iter());
        }

        Ok(url)
    }

    async fn send(&self, method: Method, path: &str, data: &Fields) -> Result<RawResponse> {
        let key = self.key().ok_or(O3vError::MissingKey)?;

        let (url, body) = if method == Method::GET {
            (self.request_url(path, data)?, None)
        } else {
            (self.request_url(path, &Fields::new())?, Some(data.encode()))
        };

        debug!(method = %method, url = %url, "Sending request");

        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()?;
        let mut request = client
            .request(method, url)
            .bearer_auth(key)
            .header(USER_AGENT, user_agent())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE);

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "Received response");

        Ok(RawResponse { status, body })
    }
}
