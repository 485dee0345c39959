pub mod auth;
pub mod mock;

pub use auth::{AuthError, AuthService};
pub use mock::MockDirectory;
