//! Client middleware pipeline
//!
//! Every call made through [`TrackerClient`](super::TrackerClient) runs the
//! request hooks in registration order before dispatch, and the response hooks
//! in registration order before the caller sees the outcome. Hooks are plain
//! synchronous functions over the request or the outcome, so closures work too.

use super::error::ClientError;
use reqwest::header::HeaderMap;
use reqwest::{Method, Request, Response, Url};
use std::sync::Arc;

/// The request as it left the pipeline, handed to the response hooks
#[derive(Debug, Clone)]
pub struct RequestParts {
    pub method: Method,
    pub url: Url,
    /// Headers after every request hook ran
    pub headers: HeaderMap,
}

impl RequestParts {
    pub fn of(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
        }
    }
}

/// Hook run on every outbound request before it is sent
pub trait RequestMiddleware: Send + Sync {
    /// Mutate the request in place. An error aborts the call.
    fn on_request(&self, request: &mut Request) -> Result<(), ClientError>;
}

/// Hook run on every response or transport failure
pub trait ResponseMiddleware: Send + Sync {
    /// Observe or rewrite the outcome of `request`. Hooks that only observe
    /// must hand the outcome back unchanged.
    fn on_response(
        &self,
        request: &RequestParts,
        outcome: Result<Response, ClientError>,
    ) -> Result<Response, ClientError>;
}

impl<F> RequestMiddleware for F
where
    F: Fn(&mut Request) -> Result<(), ClientError> + Send + Sync,
{
    fn on_request(&self, request: &mut Request) -> Result<(), ClientError> {
        self(request)
    }
}

impl<F> ResponseMiddleware for F
where
    F: Fn(&RequestParts, Result<Response, ClientError>) -> Result<Response, ClientError>
        + Send
        + Sync,
{
    fn on_response(
        &self,
        request: &RequestParts,
        outcome: Result<Response, ClientError>,
    ) -> Result<Response, ClientError> {
        self(request, outcome)
    }
}

/// Ordered pre-send and post-receive hooks
#[derive(Clone, Default)]
pub struct Pipeline {
    request: Vec<Arc<dyn RequestMiddleware>>,
    response: Vec<Arc<dyn ResponseMiddleware>>,
}

impl Pipeline {
    pub fn push_request(&mut self, middleware: Arc<dyn RequestMiddleware>) {
        self.request.push(middleware);
    }

    pub fn push_response(&mut self, middleware: Arc<dyn ResponseMiddleware>) {
        self.response.push(middleware);
    }

    /// Run the request hooks, stopping at the first error
    pub fn apply_request(&self, request: &mut Request) -> Result<(), ClientError> {
        self.request
            .iter()
            .try_for_each(|middleware| middleware.on_request(request))
    }

    /// Thread the outcome through every response hook
    pub fn apply_response(
        &self,
        request: &RequestParts,
        outcome: Result<Response, ClientError>,
    ) -> Result<Response, ClientError> {
        self.response.iter().fold(outcome, |outcome, middleware| {
            middleware.on_response(request, outcome)
        })
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .finish()
    }
}
