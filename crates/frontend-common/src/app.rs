//! Application bootstrap
//!
//! Builds the one credential store of the process and hands it to every
//! consumer explicitly: the interceptors, the router and the auth service.

use crate::auth::{CredentialStore, Notifier, SessionState};
use crate::client::{create_client, ClientError};
use crate::config::ClientConfig;
use crate::router::Router;
use crate::services::{AuthService, MockDirectory};
use crate::storage::Storage;
use std::sync::Arc;
use tracker_http::TrackerClient;

/// Everything a front end needs, wired together
#[derive(Debug, Clone)]
pub struct App {
    pub config: ClientConfig,
    pub store: Arc<CredentialStore>,
    pub router: Arc<Router>,
    pub client: TrackerClient,
    pub auth: AuthService,
}

impl App {
    /// Rehydrate the session from `storage` and wire up the client
    pub fn bootstrap(
        config: ClientConfig,
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let session = SessionState::rehydrate(storage.as_ref());
        let router = Arc::new(Router::new(session.clone()));
        let store = Arc::new(CredentialStore::new(session, storage, router.clone()));
        let client = create_client(&config, &store, notifier)?;

        let mut auth = AuthService::new(client.clone(), store.clone(), router.clone());
        if config.use_mock {
            auth = auth.with_mock_directory(Arc::new(MockDirectory::new()));
        }

        info!(
            base_url = %client.base_url(),
            authenticated = store.is_authenticated(),
            mock = config.use_mock,
            "Client initialized"
        );

        Ok(Self {
            config,
            store,
            router,
            client,
            auth,
        })
    }
}
