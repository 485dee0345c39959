//! Authentication API client methods

use super::{ClientError, TrackerClient};
use crate::types::{LoginRequest, LoginResponse, RegisterRequest};
use reqwest::Method;

impl TrackerClient {
    /// Exchange username and password for a bearer credential
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let req = self.request(Method::POST, "/api/auth/login").json(request);
        self.execute(req).await
    }

    /// Create a new account
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError> {
        let req = self.request(Method::POST, "/api/auth/register").json(request);
        self.execute_empty(req).await
    }
}
