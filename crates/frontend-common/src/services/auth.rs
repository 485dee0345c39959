//! Authentication flows: login, registration and logout

use super::mock::MockDirectory;
use crate::auth::{CredentialStore, SessionError};
use crate::router::{Navigator, RouteName};
use std::sync::Arc;
use thiserror::Error;
use tracker_http::types::{LoginRequest, LoginResponse, RegisterRequest, User};
use tracker_http::{ClientError, TrackerClient};

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Username already exists: {0}")]
    UsernameTaken(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    client: TrackerClient,
    store: Arc<CredentialStore>,
    navigator: Arc<dyn Navigator>,
    mock: Option<Arc<MockDirectory>>,
}

impl AuthService {
    /// Create a service talking to the backend auth endpoints
    pub fn new(
        client: TrackerClient,
        store: Arc<CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            client,
            store,
            navigator,
            mock: None,
        }
    }

    /// Answer login and registration from an offline directory instead
    #[must_use]
    pub fn with_mock_directory(mut self, directory: Arc<MockDirectory>) -> Self {
        self.mock = Some(directory);
        self
    }

    /// Authenticate, start the session and land on the home page
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let response = match &self.mock {
            Some(directory) => directory.login(username, password)?,
            None => self.remote_login(username, password).await?,
        };

        let user = response.user.clone();
        self.store.login(response.user, response.access_token)?;
        self.navigator.replace_route(RouteName::Home);
        Ok(user)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), AuthError> {
        if let Some(directory) = &self.mock {
            let user = directory.register(username, email, password)?;
            info!(user_id = user.id, "Registered mock account");
            return Ok(());
        }

        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        match self.client.register(&request).await {
            Ok(()) => Ok(()),
            Err(ClientError::ServerError { status: 409, .. }) => {
                Err(AuthError::UsernameTaken(username.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// End the session
    pub fn logout(&self) {
        self.store.logout();
    }

    async fn remote_login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.client.login(&request).await.map_err(|e| {
            if e.is_auth_expired() {
                AuthError::InvalidCredentials
            } else {
                AuthError::Client(e)
            }
        })
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("base_url", &self.client.base_url())
            .field("mock", &self.mock.is_some())
            .finish_non_exhaustive()
    }
}
