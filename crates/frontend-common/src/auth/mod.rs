//! Authentication module

pub mod bearer;
pub mod context;
pub mod error_handler;

// Re-export commonly used items
pub use bearer::BearerAuth;
pub use context::{CredentialStore, Credentials, SessionError, SessionState};
pub use error_handler::{Notifier, SessionExpiryHandler, TracingNotifier};
