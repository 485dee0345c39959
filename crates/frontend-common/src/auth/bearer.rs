//! Request interceptor attaching the bearer credential

use super::context::SessionState;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Request;
use tracker_http::{ClientError, RequestMiddleware};

/// Stamps `Authorization: Bearer <token>` on every outbound request while a
/// session is active. Anonymous requests go out untouched.
#[derive(Debug, Clone)]
pub struct BearerAuth {
    session: SessionState,
}

impl BearerAuth {
    pub fn new(session: SessionState) -> Self {
        Self { session }
    }
}

impl RequestMiddleware for BearerAuth {
    fn on_request(&self, request: &mut Request) -> Result<(), ClientError> {
        let Some(token) = self.session.access_token() else {
            return Ok(());
        };

        // Never fails the request: an unusable token goes out as anonymous.
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored access token is not a valid header value, sending request without it"),
        }
        Ok(())
    }
}
