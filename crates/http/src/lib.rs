//! Issue tracker HTTP module
//!
//! Provides the shared API client, its request/response middleware pipeline,
//! the repeated-key query serializer and the wire types spoken by the backend.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod types;

pub use client::{
    error::ClientError,
    middleware::{RequestMiddleware, RequestParts, ResponseMiddleware},
    query::QueryParams,
    TrackerClient, TrackerClientBuilder,
};
