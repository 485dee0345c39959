//! Session lifecycle for the issue tracker client
//!
//! The credential store persists the bearer token, the request interceptor
//! attaches it, the response interceptor drops it when the backend says 401,
//! and the router's guard keeps navigation consistent with the session.

#[macro_use]
extern crate tracing;

pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod router;
pub mod services;
pub mod storage;

pub use app::App;
pub use auth::{CredentialStore, Notifier, SessionState, TracingNotifier};
pub use client::create_client;
pub use config::{AuthConfig, ClientConfig};
pub use router::{GuardDecision, Navigator, RouteGuard, RouteName, Router};
pub use storage::{FileStorage, MemoryStorage, Storage};
