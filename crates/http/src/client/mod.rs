//! Issue tracker HTTP client

pub mod auth;
pub mod error;
pub mod issues;
pub mod middleware;
pub mod query;

use error::ClientError;
use middleware::{Pipeline, RequestMiddleware, RequestParts, ResponseMiddleware};
use query::QueryParams;
use reqwest::{header, Client, ClientBuilder, Response};
use std::sync::Arc;
use std::time::Duration;

/// Issue tracker API client.
///
/// A single instance is shared by every caller; cloning is cheap and clones
/// share the connection pool and the middleware pipeline.
#[derive(Clone, Debug)]
pub struct TrackerClient {
    client: Client,
    base_url: String,
    pipeline: Pipeline,
}

impl TrackerClient {
    /// Create a new client with default configuration and no middleware
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> TrackerClientBuilder {
        TrackerClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a request builder for `path` relative to the base URL
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, url)
    }

    /// Create a request builder whose query string is written by [`QueryParams`]
    pub fn request_with_query(
        &self,
        method: reqwest::Method,
        path: &str,
        params: &QueryParams,
    ) -> reqwest::RequestBuilder {
        if params.is_empty() {
            return self.request(method, path);
        }
        let url = format!("{}{}?{}", self.base_url, path, params.serialize());
        self.client.request(method, url)
    }

    /// Run a request through the middleware pipeline.
    ///
    /// Non-success statuses are turned into [`ClientError`] before the response
    /// hooks run, so hooks observe HTTP rejections and transport failures alike.
    pub async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, ClientError> {
        let mut request = request.build()?;
        self.pipeline.apply_request(&mut request)?;

        debug!(method = %request.method(), url = %request.url(), "Dispatching request");
        let parts = RequestParts::of(&request);
        let outcome = self.dispatch(request).await;
        self.pipeline.apply_response(&parts, outcome)
    }

    /// Execute a request and decode a JSON body
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Execute a request whose response body is ignored
    pub async fn execute_empty(&self, request: reqwest::RequestBuilder) -> Result<(), ClientError> {
        self.send(request).await.map(|_| ())
    }

    async fn dispatch(&self, request: reqwest::Request) -> Result<Response, ClientError> {
        let response = self.client.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            debug!(status = status.as_u16(), "Request rejected by server");
            Err(ClientError::from_status(status, message))
        }
    }
}

/// Builder for TrackerClient
#[derive(Default)]
pub struct TrackerClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    pipeline: Pipeline,
}

impl TrackerClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Append a pre-send hook
    pub fn request_middleware(mut self, middleware: Arc<dyn RequestMiddleware>) -> Self {
        self.pipeline.push_request(middleware);
        self
    }

    /// Append a post-receive hook
    pub fn response_middleware(mut self, middleware: Arc<dyn ResponseMiddleware>) -> Self {
        self.pipeline.push_response(middleware);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<TrackerClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClientError::Configuration("base_url is empty".into()));
        }

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let mut client_builder = ClientBuilder::new().default_headers(default_headers);

        #[cfg(not(target_arch = "wasm32"))]
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent("tracker-client/0.1.0");
        }

        let client = client_builder.build()?;

        Ok(TrackerClient {
            client,
            base_url,
            pipeline: self.pipeline,
        })
    }
}
