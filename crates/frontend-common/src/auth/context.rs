//! Credential store and derived session state

use crate::config::AuthConfig;
use crate::router::{Navigator, RouteName};
use crate::storage::Storage;
use reqwest::header::HeaderValue;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracker_http::types::User;

/// Session errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Access token must not be empty")]
    EmptyToken,

    #[error("Access token is not a valid header value")]
    InvalidToken,
}

/// In-memory credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub expiry_notice_shown: bool,
}

/// Read-only view of the current session.
///
/// Cloning shares the underlying state; only [`CredentialStore`] writes it.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<RwLock<Credentials>>,
}

impl SessionState {
    /// Rebuild the session from durable storage.
    ///
    /// Missing, unreadable or malformed entries count as absent. A user
    /// without a token (or the reverse) is treated as logged out.
    pub fn rehydrate(storage: &dyn Storage) -> Self {
        let user = read_key(storage, AuthConfig::USER_KEY).and_then(|raw| {
            serde_json::from_str::<User>(&raw)
                .inspect_err(|e| warn!("Ignoring malformed stored user: {e}"))
                .ok()
        });
        let access_token =
            read_key(storage, AuthConfig::ACCESS_TOKEN_KEY).filter(|token| usable_token(token));
        let expiry_notice_shown =
            read_key(storage, AuthConfig::EXPIRY_NOTICE_KEY).is_some_and(|flag| flag == "true");

        // The notice flag only describes a logged-out episode. A stored token
        // next to a set flag means the process died mid-expiry; the token is
        // still the live session until the backend rejects it again.
        let credentials = match (user, access_token) {
            (Some(user), Some(token)) => Credentials {
                user: Some(user),
                access_token: Some(token),
                expiry_notice_shown: false,
            },
            _ => Credentials {
                expiry_notice_shown,
                ..Credentials::default()
            },
        };

        Self {
            inner: Arc::new(RwLock::new(credentials)),
        }
    }

    /// True iff a token is present, evaluated on every call
    pub fn is_authenticated(&self) -> bool {
        self.read().access_token.is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn expiry_notice_shown(&self) -> bool {
        self.read().expiry_notice_shown
    }

    pub fn snapshot(&self) -> Credentials {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Credentials> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Credentials> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The single writer of session state.
///
/// Every mutation happens under the session write lock and is mirrored to
/// durable storage before the lock is released. Navigation runs after the
/// lock is dropped.
pub struct CredentialStore {
    session: SessionState,
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
}

impl CredentialStore {
    pub fn new(
        session: SessionState,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            storage,
            navigator,
        }
    }

    /// Shared read-only handle for interceptors, guards and views
    pub fn session(&self) -> SessionState {
        self.session.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    pub fn access_token(&self) -> Option<String> {
        self.session.access_token()
    }

    pub fn expiry_notice_shown(&self) -> bool {
        self.session.expiry_notice_shown()
    }

    /// Start a session. Clears the expiry notice flag.
    pub fn login(&self, user: User, token: impl Into<String>) -> Result<(), SessionError> {
        let token = token.into();
        if token.is_empty() {
            return Err(SessionError::EmptyToken);
        }
        if !usable_token(&token) {
            return Err(SessionError::InvalidToken);
        }

        let mut credentials = self.session.write();
        match serde_json::to_string(&user) {
            Ok(serialized) => self.store(AuthConfig::USER_KEY, &serialized),
            Err(e) => warn!("Failed to serialize user for storage: {e}"),
        }
        self.store(AuthConfig::ACCESS_TOKEN_KEY, &token);
        self.store(AuthConfig::EXPIRY_NOTICE_KEY, "false");

        info!(user_id = user.id, username = %user.username, "Logged in");
        *credentials = Credentials {
            user: Some(user),
            access_token: Some(token),
            expiry_notice_shown: false,
        };
        Ok(())
    }

    /// End the session and send the user to the login page.
    ///
    /// Safe to call when already logged out: state stays cleared and the
    /// login route replaces the current history entry again.
    pub fn logout(&self) {
        {
            let mut credentials = self.session.write();
            if credentials.access_token.is_some() {
                info!("Logged out");
            }
            self.clear(&mut credentials);
        }

        self.return_to_login();
    }

    /// Atomically claim the expiry notice for a rejected request.
    ///
    /// `sent_token` is the bearer token the rejected request carried. A
    /// rejection of a token that is no longer current (the user logged in
    /// again while the request was in flight) is stale and claims nothing.
    /// Otherwise only the caller that flips the flag from false to true wins;
    /// it also clears the credentials in the same critical section. Every
    /// later caller sees false until the next `login`.
    pub fn begin_expiry_notice(&self, sent_token: Option<&str>) -> bool {
        let mut credentials = self.session.write();
        if credentials
            .access_token
            .as_deref()
            .is_some_and(|current| Some(current) != sent_token)
        {
            debug!("Ignoring rejection of a superseded token");
            return false;
        }
        if credentials.expiry_notice_shown {
            return false;
        }

        self.clear(&mut credentials);
        credentials.expiry_notice_shown = true;
        self.store(AuthConfig::EXPIRY_NOTICE_KEY, "true");
        true
    }

    /// Replace the current route with the login page
    pub fn return_to_login(&self) {
        self.navigator.replace_route(RouteName::Login);
    }

    // Token goes first so storage never holds a token next to a set flag.
    fn clear(&self, credentials: &mut Credentials) {
        credentials.user = None;
        credentials.access_token = None;
        self.remove(AuthConfig::ACCESS_TOKEN_KEY);
        self.remove(AuthConfig::USER_KEY);
    }

    fn store(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            warn!(key, "Failed to persist session state: {e}");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            warn!(key, "Failed to clear persisted session state: {e}");
        }
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .field("expiry_notice_shown", &self.expiry_notice_shown())
            .finish_non_exhaustive()
    }
}

/// Non-empty and sendable as a bearer header
fn usable_token(token: &str) -> bool {
    !token.is_empty() && HeaderValue::from_str(token).is_ok()
}

fn read_key(storage: &dyn Storage, key: &str) -> Option<String> {
    storage
        .get_item(key)
        .inspect_err(|e| warn!(key, "Failed to read persisted session state: {e}"))
        .ok()
        .flatten()
}
