//! Frontend configuration

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Authentication configuration
pub struct AuthConfig;

impl AuthConfig {
    /// Storage key for the JSON-serialized current user
    pub const USER_KEY: &'static str = "user";

    /// Storage key for the raw bearer token
    pub const ACCESS_TOKEN_KEY: &'static str = "accessToken";

    /// Storage key for the one-shot expiry notice flag
    pub const EXPIRY_NOTICE_KEY: &'static str = "expiryNoticeShown";

    /// Endpoints whose 401 means bad credentials rather than an expired session
    pub const CREDENTIAL_EXCHANGE_PATHS: &'static [&'static str] =
        &["/api/auth/login", "/api/auth/register"];

    /// Notice shown once when the backend rejects the session
    pub const SESSION_EXPIRED_MESSAGE: &'static str =
        "Your session has expired. Please log in again.";
}

/// API client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base address of the issue tracker backend
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Use the built-in offline user directory instead of the auth endpoints
    #[serde(default)]
    pub use_mock: bool,
    /// Request timeout in seconds (0 disables the timeout)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Custom user agent
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            use_mock: false,
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from defaults, well-known files and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        let config_paths = ["tracker.toml", "config/tracker.toml"];
        for path in &config_paths {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path).required(false));
            }
        }

        builder = builder.add_source(environment());

        builder.build()?.try_deserialize()
    }

    /// Load configuration from a specific config file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path.as_ref()))
            // Environment variables can override file settings
            .add_source(environment())
            .build()?;
        config.try_deserialize()
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// `TRACKER_API_BASE_URL`, `TRACKER_USE_MOCK`, ...
fn environment() -> Environment {
    Environment::with_prefix("TRACKER")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}
