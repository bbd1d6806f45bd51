//! GitHub comment store and idempotent plan-comment reconciliation.
//! This crate derives the comment fingerprint, talks to the GitHub REST API
//! through a [`comment_store::CommentStore`] session, and decides whether a
//! run creates, edits, or skips the status comment.

pub mod comment_marker;
pub mod comment_reconciler;
pub mod comment_store;
pub mod github_api_client;
pub mod github_transport_helpers;

pub use comment_marker::{compose_comment_body, fingerprint, Fingerprint};
pub use comment_reconciler::{
    apply_comment_action, fetch_all_comments, find_marked_comment, publish_plan_comment,
    reconcile, resolve_target_issue, CommentAction, PublishOutcome, PublishRequest,
    ReconcileRequest,
};
pub use comment_store::{
    CommentPage, CommentRecord, CommentStore, IssueSearchHit, RepoRef, StoreError,
};
pub use github_api_client::{
    ConfigError, GithubCredentials, GithubSessionConfig, GithubStoreSession,
    DEFAULT_GITHUB_API_BASE,
};
pub use github_transport_helpers::truncate_for_error;
