//! Offline user directory for running the client without a backend

use super::auth::AuthError;
use std::sync::{Mutex, PoisonError};
use tracker_http::types::{LoginResponse, User};

#[derive(Debug, Clone)]
struct MockAccount {
    user: User,
    password: String,
}

/// In-memory accounts standing in for the auth endpoints
#[derive(Debug)]
pub struct MockDirectory {
    accounts: Mutex<Vec<MockAccount>>,
}

impl Default for MockDirectory {
    fn default() -> Self {
        Self {
            accounts: Mutex::new(vec![MockAccount {
                user: User {
                    id: 1,
                    username: "testuser".to_string(),
                    email: "testuser@example.com".to_string(),
                },
                password: "password123".to_string(),
            }]),
        }
    }
}

impl MockDirectory {
    /// Directory seeded with the default test account
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        accounts
            .iter()
            .find(|a| a.user.username == username && a.password == password)
            .map(|a| LoginResponse {
                user: a.user.clone(),
                access_token: format!("mock-token-{}", a.user.id),
            })
            .ok_or(AuthError::InvalidCredentials)
    }

    pub fn register(&self, username: &str, email: &str, password: &str) -> Result<User, AuthError> {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        if accounts.iter().any(|a| a.user.username == username) {
            return Err(AuthError::UsernameTaken(username.to_string()));
        }

        let user = User {
            id: accounts.len() as u64 + 1,
            username: username.to_string(),
            email: email.to_string(),
        };
        accounts.push(MockAccount {
            user: user.clone(),
            password: password.to_string(),
        });
        Ok(user)
    }
}
