//! Response interceptor handling session rejection
//!
//! A 401 from the backend means the stored credential is no longer accepted.
//! The first rejection of an episode notifies the user and logs out; any
//! sibling requests that were already in flight and fail the same way are
//! absorbed silently. The failure itself always continues to the caller.

use super::context::CredentialStore;
use crate::config::AuthConfig;
use reqwest::header::AUTHORIZATION;
use reqwest::Response;
use std::sync::Arc;
use tracker_http::{ClientError, RequestParts, ResponseMiddleware};

/// User-visible notice channel (a modal, an alert, a terminal line)
pub trait Notifier: Send + Sync {
    /// Show `message` to the user. May block until acknowledged.
    fn notify(&self, message: &str);
}

/// Reports notices through `tracing` when no UI is attached
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        warn!("{message}");
    }
}

/// Logs the session out on the first 401 of an expiry episode
pub struct SessionExpiryHandler {
    store: Arc<CredentialStore>,
    notifier: Arc<dyn Notifier>,
}

impl SessionExpiryHandler {
    pub fn new(store: Arc<CredentialStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Handle one rejected response whose request carried `sent_token`
    pub fn handle_rejection(&self, sent_token: Option<&str>) {
        // Check, set and clear happen in one critical section inside the store.
        if self.store.begin_expiry_notice(sent_token) {
            info!("Session rejected by server, logging out");
            self.notifier.notify(AuthConfig::SESSION_EXPIRED_MESSAGE);
            self.store.return_to_login();
        } else {
            debug!("Session already expired, suppressing duplicate notice");
        }
    }
}

impl ResponseMiddleware for SessionExpiryHandler {
    fn on_response(
        &self,
        request: &RequestParts,
        outcome: Result<Response, ClientError>,
    ) -> Result<Response, ClientError> {
        if let Err(error) = &outcome {
            // A 401 from a credential exchange is a wrong password, not an
            // expired session.
            if error.is_auth_expired() && !is_credential_exchange(request) {
                self.handle_rejection(bearer_token(request));
            }
        }
        outcome
    }
}

fn is_credential_exchange(request: &RequestParts) -> bool {
    let path = request.url.path();
    AuthConfig::CREDENTIAL_EXCHANGE_PATHS
        .iter()
        .any(|exchange| path.ends_with(exchange))
}

fn bearer_token(request: &RequestParts) -> Option<&str> {
    request
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl std::fmt::Debug for SessionExpiryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionExpiryHandler")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
