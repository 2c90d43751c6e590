//! HTTP access for the render pipeline.
//!
//! Every outbound call goes through [`HttpFetcher`] so the pipeline can run
//! against the network ([`ReqwestFetcher`]) or a canned script
//! ([`ScriptedFetcher`]) without touching process-wide state.

use std::sync::Mutex;

use amesh_common::{AmeshError, AmeshResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::RenderConfig;

/// A GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    /// Query parameters, URL-encoded when the request is sent
    pub query: Vec<(String, String)>,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// The URL with its query string encoded.
    pub fn full_url(&self) -> AmeshResult<String> {
        if self.query.is_empty() {
            return Ok(self.url.clone());
        }
        Url::parse_with_params(&self.url, &self.query)
            .map(String::from)
            .map_err(|e| AmeshError::Request(format!("invalid URL {}: {}", self.url, e)))
    }
}

/// A response as seen by the pipeline: status code and full body.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Capability to perform HTTP GETs.
///
/// Transport failures are errors; HTTP status codes are returned to the
/// caller, which decides whether a non-2xx answer degrades or aborts.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> AmeshResult<FetchResponse>;
}

/// Network-backed fetcher over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Build a client with the configured timeouts and user agent.
    pub fn new(config: &RenderConfig) -> AmeshResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(config.tile_concurrency)
            .build()
            .map_err(|e| AmeshError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an existing client, e.g. one shared with other API calls.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, request: &FetchRequest) -> AmeshResult<FetchResponse> {
        debug!(url = %request.url, "GET");

        let response = self
            .client
            .get(&request.url)
            .query(&request.query)
            .send()
            .await
            .map_err(|e| AmeshError::Request(format!("GET {} failed: {}", request.url, e)))?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            AmeshError::Request(format!("reading body of {} failed: {}", request.url, e))
        })?;

        Ok(FetchResponse { status, body })
    }
}

/// What a scripted route answers with.
#[derive(Debug, Clone)]
enum Scripted {
    Respond(FetchResponse),
    Fail(String),
}

/// In-memory fetcher answering from a script of URL-substring routes.
///
/// Routes are checked in insertion order against the full request URL;
/// the first match wins. Unmatched URLs answer 404. Every requested URL is
/// recorded.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    routes: Vec<(String, Scripted)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer URLs containing `pattern` with `status` and `body`.
    pub fn route(mut self, pattern: impl Into<String>, status: u16, body: impl Into<Bytes>) -> Self {
        self.routes.push((
            pattern.into(),
            Scripted::Respond(FetchResponse::new(status, body)),
        ));
        self
    }

    /// Fail URLs containing `pattern` at the transport level.
    pub fn fail(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes
            .push((pattern.into(), Scripted::Fail(message.into())));
        self
    }

    /// Every URL requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls().len()
    }

    /// Number of requested URLs containing `pattern`.
    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls().iter().filter(|url| url.contains(pattern)).count()
    }
}

#[async_trait]
impl HttpFetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> AmeshResult<FetchResponse> {
        let url = request.full_url()?;
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(url.clone());
        }

        let scripted = self
            .routes
            .iter()
            .find(|(pattern, _)| url.contains(pattern.as_str()))
            .map(|(_, scripted)| scripted.clone());

        match scripted {
            Some(Scripted::Respond(response)) => Ok(response),
            Some(Scripted::Fail(message)) => Err(AmeshError::Request(message)),
            None => Ok(FetchResponse::new(404, Bytes::new())),
        }
    }
}
