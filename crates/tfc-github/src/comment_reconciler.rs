//! Create-or-edit decision for the plan status comment.

use tracing::{debug, info, warn};

use crate::comment_marker::{compose_comment_body, fingerprint, Fingerprint};
use crate::comment_store::{CommentRecord, CommentStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Write chosen for one run.
pub enum CommentAction {
    Create { issue_number: u64, body: String },
    Edit { comment_id: u64, body: String },
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of applying a [`CommentAction`].
pub enum PublishOutcome {
    Created { issue_number: u64, comment_id: u64 },
    Updated { comment_id: u64 },
    NoTarget,
}

#[derive(Debug, Clone, Copy)]
pub struct ReconcileRequest<'a> {
    pub rendered_message: &'a str,
    pub fingerprint: &'a Fingerprint,
    pub recreate: bool,
    pub issue_number: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    pub rendered_message: &'a str,
    pub title: &'a str,
    pub commit_sha: &'a str,
    pub issue_number: Option<u64>,
    pub recreate: bool,
}

/// Walks every comment page of `issue_number` in store order.
pub async fn fetch_all_comments<S>(
    store: &S,
    issue_number: u64,
) -> Result<Vec<CommentRecord>, StoreError>
where
    S: CommentStore + ?Sized,
{
    let mut page = 1_u32;
    let mut rows = Vec::new();
    loop {
        let chunk = store.list_comments_page(issue_number, page).await?;
        debug!(
            issue_number,
            page,
            comments = chunk.comments.len(),
            "fetched comment page"
        );
        rows.extend(chunk.comments);
        match chunk.next_page {
            Some(next) if next > page => page = next,
            Some(next) => {
                warn!(
                    issue_number,
                    page,
                    next_page = next,
                    "comment pagination did not advance, stopping listing"
                );
                break;
            }
            None => break,
        }
    }
    Ok(rows)
}

/// First comment whose body carries the fingerprint marker.
pub fn find_marked_comment<'a>(
    comments: &'a [CommentRecord],
    fingerprint: &Fingerprint,
) -> Option<&'a CommentRecord> {
    comments.iter().find(|comment| {
        comment
            .body
            .as_deref()
            .is_some_and(|body| fingerprint.is_marked(body))
    })
}

/// Decides between creating a new comment and editing the marked one.
///
/// With `recreate` set no listing happens and a new comment is always created.
pub async fn reconcile<S>(
    store: &S,
    request: ReconcileRequest<'_>,
) -> Result<CommentAction, StoreError>
where
    S: CommentStore + ?Sized,
{
    let body = compose_comment_body(request.rendered_message, request.fingerprint);
    if request.recreate {
        return Ok(CommentAction::Create {
            issue_number: request.issue_number,
            body,
        });
    }

    let comments = fetch_all_comments(store, request.issue_number).await?;
    match find_marked_comment(&comments, request.fingerprint) {
        Some(existing) => Ok(CommentAction::Edit {
            comment_id: existing.id,
            body,
        }),
        None => Ok(CommentAction::Create {
            issue_number: request.issue_number,
            body,
        }),
    }
}

/// Finds the open issue or pull request that references `commit_sha`.
///
/// A blank SHA never searches: the query would match every open issue.
pub async fn resolve_target_issue<S>(
    store: &S,
    commit_sha: &str,
) -> Result<Option<u64>, StoreError>
where
    S: CommentStore + ?Sized,
{
    let commit_sha = commit_sha.trim();
    if commit_sha.is_empty() {
        debug!("no commit sha to search by");
        return Ok(None);
    }
    let query = format!("{commit_sha} repo:{} is:open", store.repo().slug());
    let hits = store.search_issues(&query).await?;
    Ok(hits.first().map(|hit| hit.number))
}

pub async fn apply_comment_action<S>(
    store: &S,
    action: &CommentAction,
) -> Result<PublishOutcome, StoreError>
where
    S: CommentStore + ?Sized,
{
    match action {
        CommentAction::Create { issue_number, body } => {
            let comment_id = store.create_comment(*issue_number, body).await?;
            info!(issue_number, comment_id, "created comment in pull request");
            Ok(PublishOutcome::Created {
                issue_number: *issue_number,
                comment_id,
            })
        }
        CommentAction::Edit { comment_id, body } => {
            store.edit_comment(*comment_id, body).await?;
            info!(comment_id, "updated comment in pull request");
            Ok(PublishOutcome::Updated {
                comment_id: *comment_id,
            })
        }
        CommentAction::Skip => {
            info!("pull request number not found");
            Ok(PublishOutcome::NoTarget)
        }
    }
}

/// Resolves the target issue, reconciles, and performs at most one write.
pub async fn publish_plan_comment<S>(
    store: &S,
    request: PublishRequest<'_>,
) -> Result<PublishOutcome, StoreError>
where
    S: CommentStore + ?Sized,
{
    let issue_number = match request.issue_number.filter(|number| *number > 0) {
        Some(number) => Some(number),
        None => resolve_target_issue(store, request.commit_sha).await?,
    };
    let action = match issue_number {
        Some(issue_number) => {
            let repo = store.repo();
            let fingerprint = fingerprint(&repo.owner, &repo.name, request.title, issue_number);
            debug!(issue_number, fingerprint = %fingerprint, "reconciling plan comment");
            reconcile(
                store,
                ReconcileRequest {
                    rendered_message: request.rendered_message,
                    fingerprint: &fingerprint,
                    recreate: request.recreate,
                    issue_number,
                },
            )
            .await?
        }
        None => CommentAction::Skip,
    };
    apply_comment_action(store, &action).await
}
