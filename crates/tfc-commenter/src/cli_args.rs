use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "tfplan-commenter",
    about = "Runs terraform plan output through a summarizer and keeps one status comment on the pull request",
    version
)]
/// Command-line and environment settings for one pipeline run.
pub(crate) struct Cli {
    #[arg(
        long = "api-key",
        env = "PLUGIN_API_KEY",
        hide_env_values = true,
        help = "API token for the GitHub API. Falls back to GITHUB_RELEASE_API_KEY or GITHUB_TOKEN"
    )]
    pub(crate) api_key: Option<String>,

    #[arg(
        long,
        env = "PLUGIN_USERNAME",
        help = "Basic auth username. Falls back to GITHUB_USERNAME or DRONE_NETRC_USERNAME"
    )]
    pub(crate) username: Option<String>,

    #[arg(
        long,
        env = "PLUGIN_PASSWORD",
        hide_env_values = true,
        help = "Basic auth password. Falls back to GITHUB_PASSWORD or DRONE_NETRC_PASSWORD"
    )]
    pub(crate) password: Option<String>,

    #[arg(
        long = "base-url",
        env = "PLUGIN_BASE_URL",
        help = "GitHub API base URL, change for GitHub Enterprise. Falls back to GITHUB_BASE_URL, then https://api.github.com/"
    )]
    pub(crate) base_url: Option<String>,

    #[arg(
        long,
        env = "PLUGIN_TITLE",
        default_value = "Terraform Plan Output",
        help = "Title heading the comment"
    )]
    pub(crate) title: String,

    #[arg(
        long,
        env = "PLUGIN_MODE",
        default_value = "full",
        help = "Comment mode [summary, simple, full]"
    )]
    pub(crate) mode: String,

    #[arg(
        long = "issue-num",
        env = "PLUGIN_ISSUE_NUM",
        help = "Issue or pull request number. Falls back to DRONE_PULL_REQUEST, then a search by commit SHA"
    )]
    pub(crate) issue_num: Option<String>,

    #[arg(
        long,
        env = "PLUGIN_RECREATE",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Create a new comment on every run instead of updating the previous one"
    )]
    pub(crate) recreate: bool,

    #[arg(
        long = "tf-root-dir",
        env = "PLUGIN_ROOT_DIR",
        help = "Directory holding the terraform files, relative to the working directory"
    )]
    pub(crate) tf_root_dir: Option<PathBuf>,

    #[arg(
        long = "tf-data-dir",
        env = "PLUGIN_TF_DATA_DIR",
        default_value = tfc_plan::DEFAULT_TF_DATA_DIR,
        help = "Terraform per-working-directory data dir (TF_DATA_DIR)"
    )]
    pub(crate) tf_data_dir: String,

    #[arg(
        long = "ca-cert",
        env = "PLUGIN_CA_CERT",
        hide_env_values = true,
        help = "PEM CA certificate installed before terraform runs"
    )]
    pub(crate) ca_cert: Option<String>,

    #[arg(
        long = "init-options",
        env = "PLUGIN_INIT_OPTIONS",
        help = "JSON options for terraform init: backend-config, lock, lock-timeout"
    )]
    pub(crate) init_options: Option<String>,

    #[arg(
        long,
        env = "PLUGIN_DEBUG",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Log terraform commands and debug output"
    )]
    pub(crate) debug: bool,

    #[arg(long = "repo-owner", env = "DRONE_REPO_OWNER", help = "Repository owner")]
    pub(crate) repo_owner: Option<String>,

    #[arg(long = "repo-name", env = "DRONE_REPO_NAME", help = "Repository name")]
    pub(crate) repo_name: Option<String>,

    #[arg(long = "commit-sha", env = "DRONE_COMMIT_SHA", help = "Commit SHA of the run")]
    pub(crate) commit_sha: Option<String>,

    #[arg(long = "netrc-machine", env = "DRONE_NETRC_MACHINE", help = "netrc machine")]
    pub(crate) netrc_machine: Option<String>,

    #[arg(long = "netrc-username", env = "DRONE_NETRC_USERNAME", help = "netrc login")]
    pub(crate) netrc_username: Option<String>,

    #[arg(
        long = "netrc-password",
        env = "DRONE_NETRC_PASSWORD",
        hide_env_values = true,
        help = "netrc password"
    )]
    pub(crate) netrc_password: Option<String>,
}
