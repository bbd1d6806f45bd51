use std::sync::Mutex;

use async_trait::async_trait;
use tfc_github::{
    fingerprint, publish_plan_comment, CommentPage, CommentRecord, CommentStore, IssueSearchHit,
    PublishOutcome, PublishRequest, RepoRef, StoreError,
};
use tfc_plan::{PlanMode, PlanSummarizer};

const PAGE_SIZE: usize = 2;
const TITLE: &str = "Terraform Plan Output";

const FIRST_PLAN: &str = "\
Terraform will perform the following actions:

  # aws_s3_bucket.logs will be created
  + resource \"aws_s3_bucket\" \"logs\" {
      + bucket = \"logs\"
    }

Plan: 1 to add, 0 to change, 0 to destroy.
";

const SECOND_PLAN: &str = "\
Terraform will perform the following actions:

  # aws_s3_bucket.logs will be updated in-place
  ~ resource \"aws_s3_bucket\" \"logs\" {
      ~ acl = \"private\" -> \"log-delivery-write\"
    }

Plan: 0 to add, 1 to change, 0 to destroy.
";

#[derive(Debug, Clone)]
struct StoredComment {
    id: u64,
    issue_number: u64,
    body: String,
}

/// In-memory issue tracker paging comments the way the REST API does.
struct InMemoryStore {
    repo: RepoRef,
    comments: Mutex<Vec<StoredComment>>,
    open_pulls: Vec<(String, u64)>,
    writes: Mutex<Vec<String>>,
}

impl InMemoryStore {
    fn new(open_pulls: Vec<(String, u64)>) -> Self {
        Self {
            repo: RepoRef::new("acme", "infra"),
            comments: Mutex::new(Vec::new()),
            open_pulls,
            writes: Mutex::new(Vec::new()),
        }
    }

    fn seed(&self, issue_number: u64, body: &str) {
        let mut comments = self.comments.lock().expect("comments lock");
        let id = comments.len() as u64 + 1;
        comments.push(StoredComment {
            id,
            issue_number,
            body: body.to_string(),
        });
    }

    fn bodies_on(&self, issue_number: u64) -> Vec<String> {
        self.comments
            .lock()
            .expect("comments lock")
            .iter()
            .filter(|comment| comment.issue_number == issue_number)
            .map(|comment| comment.body.clone())
            .collect()
    }

    fn writes(&self) -> Vec<String> {
        self.writes.lock().expect("writes lock").clone()
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    fn repo(&self) -> &RepoRef {
        &self.repo
    }

    async fn list_comments_page(
        &self,
        issue_number: u64,
        page: u32,
    ) -> Result<CommentPage, StoreError> {
        let on_issue = self
            .comments
            .lock()
            .expect("comments lock")
            .iter()
            .filter(|comment| comment.issue_number == issue_number)
            .cloned()
            .collect::<Vec<_>>();
        let start = (page.saturating_sub(1) as usize) * PAGE_SIZE;
        let comments = on_issue
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .map(|comment| CommentRecord {
                id: comment.id,
                body: Some(comment.body.clone()),
            })
            .collect();
        let next_page = (start + PAGE_SIZE < on_issue.len()).then_some(page + 1);
        Ok(CommentPage {
            comments,
            next_page,
        })
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<u64, StoreError> {
        self.seed(issue_number, body);
        self.writes
            .lock()
            .expect("writes lock")
            .push(format!("create:{issue_number}"));
        let comments = self.comments.lock().expect("comments lock");
        Ok(comments.len() as u64)
    }

    async fn edit_comment(&self, comment_id: u64, body: &str) -> Result<(), StoreError> {
        let mut comments = self.comments.lock().expect("comments lock");
        let comment = comments
            .iter_mut()
            .find(|comment| comment.id == comment_id)
            .ok_or_else(|| StoreError::Backend {
                operation: "edit issue comment",
                message: format!("comment {comment_id} does not exist"),
            })?;
        comment.body = body.to_string();
        self.writes
            .lock()
            .expect("writes lock")
            .push(format!("edit:{comment_id}"));
        Ok(())
    }

    async fn search_issues(&self, query: &str) -> Result<Vec<IssueSearchHit>, StoreError> {
        Ok(self
            .open_pulls
            .iter()
            .filter(|(sha, _)| query.starts_with(sha.as_str()))
            .map(|(_, number)| IssueSearchHit { number: *number })
            .collect())
    }
}

fn render(raw: &str, mode: PlanMode) -> String {
    PlanSummarizer::new(mode)
        .expect("summarizer")
        .render(raw, TITLE)
}

async fn publish(
    store: &InMemoryStore,
    rendered: &str,
    issue_number: Option<u64>,
    recreate: bool,
) -> PublishOutcome {
    publish_plan_comment(
        store,
        PublishRequest {
            rendered_message: rendered,
            title: TITLE,
            commit_sha: "f00dfeed",
            issue_number,
            recreate,
        },
    )
    .await
    .expect("publish")
}

#[tokio::test]
async fn integration_second_run_edits_the_first_runs_comment_in_place() {
    let store = InMemoryStore::new(Vec::new());
    for body in ["lgtm", "please add tags", "ci is green"] {
        store.seed(4, body);
    }

    let first = publish(&store, &render(FIRST_PLAN, PlanMode::Simple), Some(4), false).await;
    let PublishOutcome::Created { comment_id, .. } = first else {
        panic!("expected a created comment, got {first:?}");
    };

    let second = publish(&store, &render(SECOND_PLAN, PlanMode::Simple), Some(4), false).await;
    assert_eq!(second, PublishOutcome::Updated { comment_id });

    let bodies = store.bodies_on(4);
    assert_eq!(bodies.len(), 4);
    let marker = fingerprint("acme", "infra", TITLE, 4).marker();
    let marked = bodies
        .iter()
        .filter(|body| body.contains(&marker))
        .collect::<Vec<_>>();
    assert_eq!(marked.len(), 1);
    assert!(marked[0].contains("Plan: 0 to add, 1 to change, 0 to destroy."));
    assert!(!marked[0].contains("1 to add"));
    assert_eq!(
        store.writes(),
        vec!["create:4".to_string(), format!("edit:{comment_id}")]
    );
}

#[tokio::test]
async fn integration_recreate_appends_a_new_comment_each_run() {
    let store = InMemoryStore::new(Vec::new());
    let rendered = render(FIRST_PLAN, PlanMode::Summary);

    publish(&store, &rendered, Some(8), true).await;
    publish(&store, &rendered, Some(8), true).await;

    assert_eq!(store.bodies_on(8).len(), 2);
    assert_eq!(
        store.writes(),
        vec!["create:8".to_string(), "create:8".to_string()]
    );
}

#[tokio::test]
async fn integration_titles_keep_separate_comments_on_one_pull_request() {
    let store = InMemoryStore::new(Vec::new());
    let rendered = render(FIRST_PLAN, PlanMode::Full);

    publish(&store, &rendered, Some(2), false).await;
    let other = publish_plan_comment(
        &store,
        PublishRequest {
            rendered_message: &rendered,
            title: "Staging Plan",
            commit_sha: "f00dfeed",
            issue_number: Some(2),
            recreate: false,
        },
    )
    .await
    .expect("publish staging");

    assert!(matches!(other, PublishOutcome::Created { issue_number: 2, .. }));
    assert_eq!(store.bodies_on(2).len(), 2);
}

#[tokio::test]
async fn functional_commit_lookup_targets_the_open_pull_request() {
    let store = InMemoryStore::new(vec![("f00dfeed".to_string(), 31)]);
    let outcome = publish(&store, &render(FIRST_PLAN, PlanMode::Summary), None, false).await;
    assert!(matches!(outcome, PublishOutcome::Created { issue_number: 31, .. }));

    let unmatched = InMemoryStore::new(vec![("0ther".to_string(), 5)]);
    let outcome = publish(&unmatched, &render(FIRST_PLAN, PlanMode::Summary), None, false).await;
    assert_eq!(outcome, PublishOutcome::NoTarget);
    assert!(unmatched.writes().is_empty());
}
