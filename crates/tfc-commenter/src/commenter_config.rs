use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tfc_github::github_api_client::normalize_api_base;
use tfc_github::{GithubCredentials, GithubSessionConfig, RepoRef, DEFAULT_GITHUB_API_BASE};
use tfc_plan::PlanMode;

use crate::cli_args::Cli;

const API_KEY_FALLBACK_ENV: &[&str] = &["GITHUB_RELEASE_API_KEY", "GITHUB_TOKEN"];
const USERNAME_FALLBACK_ENV: &[&str] = &["GITHUB_USERNAME", "DRONE_NETRC_USERNAME"];
const PASSWORD_FALLBACK_ENV: &[&str] = &["GITHUB_PASSWORD", "DRONE_NETRC_PASSWORD"];
const BASE_URL_FALLBACK_ENV: &[&str] = &["GITHUB_BASE_URL"];
const ISSUE_NUM_FALLBACK_ENV: &[&str] = &["DRONE_PULL_REQUEST"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
/// Options forwarded to `terraform init`.
pub(crate) struct InitOptions {
    #[serde(rename = "backend-config", default)]
    pub(crate) backend_config: Vec<String>,
    #[serde(default)]
    pub(crate) lock: Option<bool>,
    #[serde(rename = "lock-timeout", default)]
    pub(crate) lock_timeout: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct TerraformSettings {
    pub(crate) root_dir: Option<PathBuf>,
    pub(crate) data_dir: String,
    pub(crate) ca_cert: Option<String>,
    pub(crate) init_options: InitOptions,
    pub(crate) debug: bool,
}

#[derive(Clone, PartialEq, Eq)]
pub(crate) struct NetrcEntry {
    pub(crate) machine: String,
    pub(crate) login: String,
    pub(crate) password: String,
}

impl std::fmt::Debug for NetrcEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetrcEntry")
            .field("machine", &self.machine)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
/// Validated settings for one run. Built before any process or network call.
pub(crate) struct CommenterConfig {
    pub(crate) session: GithubSessionConfig,
    pub(crate) title: String,
    pub(crate) mode: PlanMode,
    pub(crate) issue_number: Option<u64>,
    pub(crate) commit_sha: String,
    pub(crate) recreate: bool,
    pub(crate) terraform: TerraformSettings,
    pub(crate) netrc: Option<NetrcEntry>,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

fn with_env_fallback<F>(primary: Option<&str>, fallbacks: &[&str], lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(primary).or_else(|| {
        fallbacks
            .iter()
            .find_map(|key| non_empty(lookup(key).as_deref()))
    })
}

pub(crate) fn parse_issue_number(raw: Option<&str>) -> Result<Option<u64>> {
    let Some(raw) = non_empty(raw) else {
        return Ok(None);
    };
    let parsed = raw
        .parse::<u64>()
        .with_context(|| format!("invalid issue number `{raw}`"))?;
    Ok((parsed > 0).then_some(parsed))
}

pub(crate) fn parse_init_options(raw: Option<&str>) -> Result<InitOptions> {
    match non_empty(raw) {
        None => Ok(InitOptions::default()),
        Some(raw) => serde_json::from_str(&raw).context("failed to parse init options json"),
    }
}

/// Resolves the run settings from parsed flags plus fallback environment
/// variables read through `lookup`.
pub(crate) fn resolve_commenter_config<F>(cli: &Cli, lookup: F) -> Result<CommenterConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let token = with_env_fallback(cli.api_key.as_deref(), API_KEY_FALLBACK_ENV, &lookup);
    let username = with_env_fallback(cli.username.as_deref(), USERNAME_FALLBACK_ENV, &lookup);
    let password = with_env_fallback(cli.password.as_deref(), PASSWORD_FALLBACK_ENV, &lookup);
    let credentials = GithubCredentials::from_parts(
        token.as_deref(),
        username.as_deref(),
        password.as_deref(),
    )?;

    let mode: PlanMode = cli.mode.parse()?;

    let owner = non_empty(cli.repo_owner.as_deref()).unwrap_or_default();
    let name = non_empty(cli.repo_name.as_deref()).unwrap_or_default();
    if owner.is_empty() {
        bail!("repository owner is required (--repo-owner or DRONE_REPO_OWNER)");
    }
    if name.is_empty() {
        bail!("repository name is required (--repo-name or DRONE_REPO_NAME)");
    }

    let api_base = normalize_api_base(
        &with_env_fallback(cli.base_url.as_deref(), BASE_URL_FALLBACK_ENV, &lookup)
            .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string()),
    )?;

    let issue_number = parse_issue_number(
        with_env_fallback(cli.issue_num.as_deref(), ISSUE_NUM_FALLBACK_ENV, &lookup).as_deref(),
    )?;
    let commit_sha = non_empty(cli.commit_sha.as_deref()).unwrap_or_default();
    if issue_number.is_none() && commit_sha.is_empty() {
        bail!("an issue number or a commit SHA is required to locate the pull request");
    }

    let init_options = parse_init_options(cli.init_options.as_deref())?;
    let netrc = non_empty(cli.netrc_machine.as_deref()).map(|machine| NetrcEntry {
        machine,
        login: cli.netrc_username.clone().unwrap_or_default(),
        password: cli.netrc_password.clone().unwrap_or_default(),
    });

    Ok(CommenterConfig {
        session: GithubSessionConfig {
            api_base,
            credentials,
            repo: RepoRef::new(owner, name),
        },
        title: cli.title.clone(),
        mode,
        issue_number,
        commit_sha,
        recreate: cli.recreate,
        terraform: TerraformSettings {
            root_dir: cli.tf_root_dir.clone(),
            data_dir: cli.tf_data_dir.clone(),
            ca_cert: non_empty(cli.ca_cert.as_deref()),
            init_options,
            debug: cli.debug,
        },
        netrc,
    })
}
