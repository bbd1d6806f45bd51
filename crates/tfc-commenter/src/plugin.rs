use anyhow::{Context, Result};
use tfc_github::{
    publish_plan_comment, CommentStore, GithubStoreSession, PublishOutcome, PublishRequest,
};
use tfc_plan::PlanSummarizer;
use tracing::{debug, info};

use crate::commenter_config::CommenterConfig;
use crate::netrc::{netrc_home, write_netrc};
use crate::terraform_runner::TerraformRunner;

/// Summarizes captured plan output and publishes it through `store`.
pub(crate) async fn publish_plan_output<S>(
    store: &S,
    config: &CommenterConfig,
    raw_plan: &str,
) -> Result<PublishOutcome>
where
    S: CommentStore + ?Sized,
{
    let summarizer = PlanSummarizer::new(config.mode)?;
    let rendered = summarizer.render(raw_plan, &config.title);
    debug!(
        mode = %config.mode,
        rendered_chars = rendered.len(),
        "rendered plan message"
    );
    publish_plan_comment(
        store,
        PublishRequest {
            rendered_message: &rendered,
            title: &config.title,
            commit_sha: &config.commit_sha,
            issue_number: config.issue_number,
            recreate: config.recreate,
        },
    )
    .await
    .context("failed to publish plan comment")
}

/// One full pipeline run: terraform setup, `show`, summarize, publish.
pub(crate) async fn run_plugin(config: &CommenterConfig) -> Result<PublishOutcome> {
    let session = GithubStoreSession::connect(config.session.clone())
        .context("failed to create github client")?;

    if let Some(entry) = config.netrc.as_ref() {
        let path = write_netrc(&netrc_home(), entry).await?;
        debug!(path = %path.display(), machine = %entry.machine, "wrote netrc");
    }

    let runner = TerraformRunner::from_current_dir(config.terraform.clone())?;
    info!(working_dir = %runner.working_dir().display(), "preparing terraform");
    runner.prepare().await?;
    let raw_plan = runner.show_plan().await?;

    publish_plan_output(&session, config, &raw_plan).await
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;
    use tfc_github::{
        compose_comment_body, fingerprint, GithubCredentials, GithubSessionConfig,
        GithubStoreSession, PublishOutcome, RepoRef,
    };
    use tfc_plan::PlanMode;

    use super::publish_plan_output;
    use crate::commenter_config::{CommenterConfig, InitOptions, TerraformSettings};

    const RAW_PLAN: &str = "Refreshing state...\n\n  # aws_s3_bucket.logs will be created\n  + resource \"aws_s3_bucket\" \"logs\" {\n      + bucket = \"logs\"\n    }\n\nPlan: 1 to add, 0 to change, 0 to destroy.\n";

    fn config(server: &MockServer, mode: PlanMode, issue_number: Option<u64>) -> CommenterConfig {
        CommenterConfig {
            session: GithubSessionConfig {
                api_base: server.base_url(),
                credentials: GithubCredentials::Token("test-token".to_string()),
                repo: RepoRef::new("acme", "infra"),
            },
            title: "Plan".to_string(),
            mode,
            issue_number,
            commit_sha: "cafe01".to_string(),
            recreate: false,
            terraform: TerraformSettings {
                root_dir: None,
                data_dir: ".terraform".to_string(),
                ca_cert: None,
                init_options: InitOptions::default(),
                debug: false,
            },
            netrc: None,
        }
    }

    #[tokio::test]
    async fn integration_publish_plan_output_posts_summary_with_marker() {
        let server = MockServer::start();
        let expected_body = compose_comment_body(
            "## Plan\n\n```diff\nPlan: 1 to add, 0 to change, 0 to destroy.\n```\n",
            &fingerprint("acme", "infra", "Plan", 9),
        );
        let list = server.mock(|when, then| {
            when.method(GET).path("/repos/acme/infra/issues/9/comments");
            then.status(200).json_body(json!([]));
        });
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/repos/acme/infra/issues/9/comments")
                .json_body(json!({ "body": expected_body }));
            then.status(201).json_body(json!({ "id": 77 }));
        });

        let config = config(&server, PlanMode::Summary, Some(9));
        let session = GithubStoreSession::connect(config.session.clone()).expect("session");
        let outcome = publish_plan_output(&session, &config, RAW_PLAN)
            .await
            .expect("publish");

        assert_eq!(
            outcome,
            PublishOutcome::Created {
                issue_number: 9,
                comment_id: 77
            }
        );
        list.assert_calls(1);
        create.assert_calls(1);
    }

    #[tokio::test]
    async fn functional_publish_plan_output_locates_pull_request_by_commit() {
        let server = MockServer::start();
        let search = server.mock(|when, then| {
            when.method(GET)
                .path("/search/issues")
                .query_param("q", "cafe01 repo:acme/infra is:open");
            then.status(200).json_body(json!({
                "total_count": 1,
                "items": [{ "number": 15, "title": "Add logs bucket" }]
            }));
        });
        let list = server.mock(|when, then| {
            when.method(GET).path("/repos/acme/infra/issues/15/comments");
            then.status(200).json_body(json!([]));
        });
        let create = server.mock(|when, then| {
            when.method(POST).path("/repos/acme/infra/issues/15/comments");
            then.status(201).json_body(json!({ "id": 3 }));
        });

        let config = config(&server, PlanMode::Full, None);
        let session = GithubStoreSession::connect(config.session.clone()).expect("session");
        let outcome = publish_plan_output(&session, &config, RAW_PLAN)
            .await
            .expect("publish");

        assert_eq!(
            outcome,
            PublishOutcome::Created {
                issue_number: 15,
                comment_id: 3
            }
        );
        search.assert_calls(1);
        list.assert_calls(1);
        create.assert_calls(1);
    }

    #[tokio::test]
    async fn regression_publish_plan_output_wraps_store_failures() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/acme/infra/issues/9/comments");
            then.status(401).body("Bad credentials");
        });

        let config = config(&server, PlanMode::Simple, Some(9));
        let session = GithubStoreSession::connect(config.session.clone()).expect("session");
        let error = publish_plan_output(&session, &config, RAW_PLAN)
            .await
            .expect_err("unauthorized");
        let rendered = format!("{error:#}");
        assert!(rendered.contains("failed to publish plan comment"));
        assert!(rendered.contains("401"));
    }
}
