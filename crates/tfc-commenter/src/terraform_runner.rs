use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tfc_github::truncate_for_error;
use tfc_plan::plan_artifact_path;
use tracing::debug;

use crate::commenter_config::{InitOptions, TerraformSettings};

const TERRAFORM_BIN: &str = "terraform";
const CA_CERT_PATH: &str = "/usr/local/share/ca-certificates/ca_cert.crt";
const STDERR_MAX_CHARS: usize = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CommandStep {
    pub(crate) program: &'static str,
    pub(crate) args: Vec<String>,
}

impl CommandStep {
    fn terraform<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: TERRAFORM_BIN,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    fn render(&self) -> String {
        let mut rendered = self.program.to_string();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

/// Arguments for `terraform init`; unset options keep terraform's defaults.
pub(crate) fn init_args(options: &InitOptions) -> Vec<String> {
    let mut args = vec!["init".to_string()];
    for value in &options.backend_config {
        args.push(format!("-backend-config={value}"));
    }
    if let Some(lock) = options.lock {
        args.push(format!("-lock={lock}"));
    }
    if let Some(timeout) = options
        .lock_timeout
        .as_deref()
        .filter(|value| !value.trim().is_empty())
    {
        args.push(format!("-lock-timeout={timeout}"));
    }
    args.push("-input=false".to_string());
    args
}

pub(crate) fn show_plan_step(data_dir: &str) -> CommandStep {
    CommandStep::terraform(["show", "-no-color", plan_artifact_path(Some(data_dir)).as_str()])
}

/// Runs terraform commands inside the configured root dir.
#[derive(Debug, Clone)]
pub(crate) struct TerraformRunner {
    working_dir: PathBuf,
    settings: TerraformSettings,
}

impl TerraformRunner {
    pub(crate) fn new(base_dir: &Path, settings: TerraformSettings) -> Self {
        let working_dir = match &settings.root_dir {
            Some(root_dir) => base_dir.join(root_dir),
            None => base_dir.to_path_buf(),
        };
        Self {
            working_dir,
            settings,
        }
    }

    pub(crate) fn from_current_dir(settings: TerraformSettings) -> Result<Self> {
        let base_dir = std::env::current_dir().context("failed to resolve working directory")?;
        Ok(Self::new(&base_dir, settings))
    }

    pub(crate) fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn command(&self, step: &CommandStep) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(step.program);
        command.args(&step.args);
        command.current_dir(&self.working_dir);
        command.env("TF_DATA_DIR", &self.settings.data_dir);
        command.stdin(Stdio::null());
        command
    }

    async fn run_step(&self, step: &CommandStep) -> Result<()> {
        if self.settings.debug {
            debug!("$ {}", step.render());
        }
        let status = self
            .command(step)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .with_context(|| format!("failed to execute `{}`", step.render()))?;
        if !status.success() {
            bail!(
                "`{}` failed with exit code {}",
                step.render(),
                status.code().unwrap_or(1)
            );
        }
        debug!(command = %step.render(), "command completed successfully");
        Ok(())
    }

    async fn install_ca_cert(&self, cert: &str) -> Result<()> {
        tokio::fs::write(CA_CERT_PATH, cert)
            .await
            .with_context(|| format!("failed to write CA certificate to {CA_CERT_PATH}"))?;
        self.run_step(&CommandStep {
            program: "update-ca-certificates",
            args: Vec::new(),
        })
        .await
    }

    async fn clear_data_dir(&self) -> Result<()> {
        let data_dir = self.working_dir.join(&self.settings.data_dir);
        match tokio::fs::remove_dir_all(&data_dir).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error).with_context(|| {
                format!("failed to clear terraform data dir {}", data_dir.display())
            }),
        }
    }

    /// `terraform version`, optional CA install, a clean data dir, `init`, `get`.
    pub(crate) async fn prepare(&self) -> Result<()> {
        self.run_step(&CommandStep::terraform(["version"])).await?;
        if let Some(cert) = self.settings.ca_cert.as_deref() {
            self.install_ca_cert(cert).await?;
        }
        self.clear_data_dir().await?;
        self.run_step(&CommandStep::terraform(init_args(&self.settings.init_options)))
            .await?;
        self.run_step(&CommandStep::terraform(["get"])).await
    }

    /// Captures `terraform show -no-color` of the saved plan.
    pub(crate) async fn show_plan(&self) -> Result<String> {
        let step = show_plan_step(&self.settings.data_dir);
        if self.settings.debug {
            debug!("$ {}", step.render());
        }
        let output = self
            .command(&step)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("failed to execute `{}`", step.render()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "`{}` failed with exit code {}: {}",
                step.render(),
                output.status.code().unwrap_or(1),
                truncate_for_error(stderr.trim(), STDERR_MAX_CHARS)
            );
        }
        String::from_utf8(output.stdout).context("terraform show output is not valid UTF-8")
    }
}
