//! Issue, label and comment API client methods

use crate::client::{ClientError, TrackerClient};
use crate::types::{Comment, Issue, IssueFilter, IssueForm, IssuesResponse, Label};
use reqwest::Method;

impl TrackerClient {
    /// List issues matching the filter
    pub async fn list_issues(&self, filter: &IssueFilter) -> Result<IssuesResponse, ClientError> {
        let request = self.request_with_query(Method::GET, "/api/issues", &filter.to_query());
        self.execute(request).await
    }

    /// Get a single issue
    pub async fn get_issue(&self, id: u64) -> Result<Issue, ClientError> {
        let request = self.request(Method::GET, &format!("/api/issues/{id}"));
        self.execute(request).await
    }

    /// Create an issue
    pub async fn create_issue(&self, form: &IssueForm) -> Result<Issue, ClientError> {
        let request = self.request(Method::POST, "/api/issues").json(form);
        self.execute(request).await
    }

    /// List all labels
    pub async fn list_labels(&self) -> Result<Vec<Label>, ClientError> {
        let request = self.request(Method::GET, "/api/labels");
        self.execute(request).await
    }

    /// List the comment tree of an issue
    pub async fn list_comments(&self, issue_id: u64) -> Result<Vec<Comment>, ClientError> {
        let request = self.request(Method::GET, &format!("/api/issues/{issue_id}/comments"));
        self.execute(request).await
    }
}
