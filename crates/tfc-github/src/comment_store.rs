use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Repository addressed by a store session.
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// Comment fields consumed by reconciliation.
pub struct CommentRecord {
    pub id: u64,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// One page of issue comments and the page that follows it, if any.
pub struct CommentPage {
    pub comments: Vec<CommentRecord>,
    pub next_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IssueSearchHit {
    pub number: u64,
}

#[derive(Debug, Error)]
/// Enumerates failures talking to the comment store.
pub enum StoreError {
    #[error("github api {operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("github api {operation} failed with status {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to decode github {operation}: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("comment store {operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Transport { operation, .. }
            | Self::Status { operation, .. }
            | Self::Decode { operation, .. }
            | Self::Backend { operation, .. } => operation,
        }
    }
}

#[async_trait]
/// Comment operations the reconciler needs from the backing store.
pub trait CommentStore: Send + Sync {
    fn repo(&self) -> &RepoRef;

    /// Lists one page of comments on `issue_number`; pages start at 1.
    async fn list_comments_page(
        &self,
        issue_number: u64,
        page: u32,
    ) -> Result<CommentPage, StoreError>;

    /// Creates a comment and returns its identifier.
    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<u64, StoreError>;

    async fn edit_comment(&self, comment_id: u64, body: &str) -> Result<(), StoreError>;

    /// Free-text issue search; the query carries its own repository scope.
    async fn search_issues(&self, query: &str) -> Result<Vec<IssueSearchHit>, StoreError>;
}
