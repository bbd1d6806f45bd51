use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::commenter_config::NetrcEntry;

pub(crate) fn render_netrc(entry: &NetrcEntry) -> String {
    format!(
        "\nmachine {}\nlogin {}\npassword {}\n",
        entry.machine, entry.login, entry.password
    )
}

/// Home directory used for `.netrc`, `/root` when `HOME` is unset.
pub(crate) fn netrc_home() -> PathBuf {
    std::env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/root"))
}

/// Writes `<home>/.netrc` so terraform module fetches can clone over https.
pub(crate) async fn write_netrc(home: &Path, entry: &NetrcEntry) -> Result<PathBuf> {
    let path = home.join(".netrc");
    tokio::fs::write(&path, render_netrc(entry))
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    restrict_permissions(&path).await?;
    Ok(path)
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .with_context(|| format!("failed to restrict permissions on {}", path.display()))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
