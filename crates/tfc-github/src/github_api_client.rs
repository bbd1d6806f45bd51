use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

use crate::comment_store::{
    CommentPage, CommentRecord, CommentStore, IssueSearchHit, RepoRef, StoreError,
};
use crate::github_transport_helpers::{
    next_page_from_headers, status_error_body, truncate_for_error,
};

pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com/";
const COMMENTS_PER_PAGE: &str = "100";
const ERROR_BODY_MAX_CHARS: usize = 800;

#[derive(Debug, Error)]
/// Enumerates setup failures raised before any request is sent.
pub enum ConfigError {
    #[error("you must provide an API key or a username and password")]
    MissingCredentials,
    #[error("repository {field} is required")]
    MissingRepository { field: &'static str },
    #[error("failed to parse base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("failed to create github api client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Clone, PartialEq, Eq)]
/// Credentials attached to every store request.
pub enum GithubCredentials {
    Token(String),
    Basic { username: String, password: String },
}

impl GithubCredentials {
    /// Prefers a non-empty token, otherwise requires both basic-auth halves.
    pub fn from_parts(
        token: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToOwned::to_owned)
        };
        if let Some(token) = non_empty(token) {
            return Ok(Self::Token(token));
        }
        match (non_empty(username), non_empty(password)) {
            (Some(username), Some(password)) => Ok(Self::Basic { username, password }),
            _ => Err(ConfigError::MissingCredentials),
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self {
            Self::Token(token) => request.bearer_auth(token),
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
        }
    }
}

impl fmt::Debug for GithubCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(<redacted>)"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GithubSessionConfig {
    pub api_base: String,
    pub credentials: GithubCredentials,
    pub repo: RepoRef,
}

/// Normalizes the API base so it always ends with `/`.
pub fn normalize_api_base(raw: &str) -> Result<String, ConfigError> {
    let mut api_base = raw.trim().to_string();
    if !api_base.ends_with('/') {
        api_base.push('/');
    }
    reqwest::Url::parse(&api_base).map_err(|error| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: error.to_string(),
    })?;
    Ok(api_base)
}

#[derive(Debug, Deserialize)]
struct CommentIdResponse {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct SearchIssuesResponse {
    #[serde(default)]
    items: Vec<IssueSearchHit>,
}

/// Immutable GitHub session: one HTTP client bound to a base URL, credentials
/// and repository. Built once by [`GithubStoreSession::connect`].
#[derive(Debug, Clone)]
pub struct GithubStoreSession {
    http: reqwest::Client,
    api_base: String,
    credentials: GithubCredentials,
    repo: RepoRef,
}

impl GithubStoreSession {
    pub fn connect(config: GithubSessionConfig) -> Result<Self, ConfigError> {
        if config.repo.owner.trim().is_empty() {
            return Err(ConfigError::MissingRepository { field: "owner" });
        }
        if config.repo.name.trim().is_empty() {
            return Err(ConfigError::MissingRepository { field: "name" });
        }
        let api_base = normalize_api_base(&config.api_base)?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("tfplan-commenter"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self {
            http,
            api_base,
            credentials: config.credentials,
            repo: config.repo,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn repo_url(&self, suffix: &str) -> String {
        format!(
            "{}repos/{}/{}/{suffix}",
            self.api_base, self.repo.owner, self.repo.name
        )
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, StoreError> {
        let response = self
            .credentials
            .authorize(request)
            .send()
            .await
            .map_err(|source| StoreError::Transport { operation, source })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = status_error_body(response.text().await);
        Err(StoreError::Status {
            operation,
            status: status.as_u16(),
            body: truncate_for_error(&body, ERROR_BODY_MAX_CHARS),
        })
    }

    async fn decode<T: DeserializeOwned>(
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<T, StoreError> {
        response
            .json::<T>()
            .await
            .map_err(|source| StoreError::Decode { operation, source })
    }
}

#[async_trait]
impl CommentStore for GithubStoreSession {
    fn repo(&self) -> &RepoRef {
        &self.repo
    }

    async fn list_comments_page(
        &self,
        issue_number: u64,
        page: u32,
    ) -> Result<CommentPage, StoreError> {
        const OPERATION: &str = "list issue comments";
        let page_value = page.to_string();
        let request = self
            .http
            .get(self.repo_url(&format!("issues/{issue_number}/comments")))
            .query(&[("per_page", COMMENTS_PER_PAGE), ("page", page_value.as_str())]);
        let response = self.send(OPERATION, request).await?;
        let next_page = next_page_from_headers(response.headers());
        let comments: Vec<CommentRecord> = Self::decode(OPERATION, response).await?;
        Ok(CommentPage {
            comments,
            next_page,
        })
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<u64, StoreError> {
        const OPERATION: &str = "create issue comment";
        let request = self
            .http
            .post(self.repo_url(&format!("issues/{issue_number}/comments")))
            .json(&json!({ "body": body }));
        let response = self.send(OPERATION, request).await?;
        let created: CommentIdResponse = Self::decode(OPERATION, response).await?;
        Ok(created.id)
    }

    async fn edit_comment(&self, comment_id: u64, body: &str) -> Result<(), StoreError> {
        const OPERATION: &str = "update issue comment";
        let request = self
            .http
            .patch(self.repo_url(&format!("issues/comments/{comment_id}")))
            .json(&json!({ "body": body }));
        self.send(OPERATION, request).await?;
        Ok(())
    }

    async fn search_issues(&self, query: &str) -> Result<Vec<IssueSearchHit>, StoreError> {
        const OPERATION: &str = "search issues";
        let request = self
            .http
            .get(format!("{}search/issues", self.api_base))
            .query(&[("q", query)]);
        let response = self.send(OPERATION, request).await?;
        let found: SearchIssuesResponse = Self::decode(OPERATION, response).await?;
        Ok(found.items)
    }
}
