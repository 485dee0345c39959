//! Client configuration and initialization

use crate::auth::{BearerAuth, CredentialStore, Notifier, SessionExpiryHandler};
use crate::config::ClientConfig;
pub use tracker_http::ClientError;
use std::sync::Arc;
use tracker_http::TrackerClient;

/// Build the shared API client with the session interceptors installed.
///
/// The bearer interceptor reads the store's session on every request, and
/// the expiry handler logs the store out on the first 401 of an episode.
pub fn create_client(
    config: &ClientConfig,
    store: &Arc<CredentialStore>,
    notifier: Arc<dyn Notifier>,
) -> Result<TrackerClient, ClientError> {
    let mut builder = TrackerClient::builder()
        .base_url(config.api_base_url.clone())
        .request_middleware(Arc::new(BearerAuth::new(store.session())))
        .response_middleware(Arc::new(SessionExpiryHandler::new(store.clone(), notifier)));

    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent.clone());
    }

    builder.build()
}
