//! Wire types exchanged with the issue tracker backend

use crate::client::query::QueryParams;
use serde::{Deserialize, Serialize};

/// Authenticated user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
}

/// Login request
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response carrying the bearer credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
}

/// Registration request
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Issue label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: u64,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub issue_open_count: u64,
}

/// Issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub author_id: u64,
    pub assignee_id: Option<u64>,
    #[serde(default)]
    pub label_ids: Vec<u64>,
    pub created_at: String,
    pub updated_at: String,
}

/// Issue create/update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueForm {
    pub title: String,
    pub description: String,
    pub assignee_id: Option<u64>,
    pub label_ids: Vec<u64>,
}

/// Pagination metadata of an issue listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

/// Issue listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuesResponse {
    pub meta: Meta,
    pub issues: Vec<Issue>,
}

/// Generic page of results (`Page<T>` on the backend)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_pages: u32,
    pub total_elements: u64,
    /// Zero-based page index
    pub number: u32,
    pub size: u32,
}

/// Issue comment, possibly with nested replies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub issue_id: u64,
    pub author_id: u64,
    #[serde(default)]
    pub author: Option<String>,
    pub parent_id: Option<u64>,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub children: Vec<Comment>,
}

/// Filters for `GET /api/issues`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub status: Option<String>,
    pub query: Option<String>,
    pub label_ids: Vec<u64>,
    pub assignee_id: Option<u64>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl IssueFilter {
    /// Query parameters in the order the backend documents them
    pub fn to_query(&self) -> QueryParams {
        QueryParams::new()
            .optional("status", self.status.as_deref())
            .optional("q", self.query.as_deref())
            .many("labelIds", &self.label_ids)
            .optional("assigneeId", self.assignee_id)
            .optional("page", self.page)
            .optional("size", self.size)
    }
}
