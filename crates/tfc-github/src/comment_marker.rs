use std::fmt;

use sha2::{Digest, Sha256};

pub const COMMENT_MARKER_PREFIX: &str = "<!-- id: ";
pub const COMMENT_MARKER_SUFFIX: &str = " -->";

/// Lowercase hex SHA-256 identifying one (owner, repo, title, issue) target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hidden HTML comment embedded in the published body.
    pub fn marker(&self) -> String {
        format!("{COMMENT_MARKER_PREFIX}{}{COMMENT_MARKER_SUFFIX}", self.0)
    }

    pub fn is_marked(&self, body: &str) -> bool {
        body.contains(&self.marker())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the comment fingerprint from `owner/repo/title/issue_number`.
///
/// Fields are joined with `/` without escaping, so `("a/b", "c")` and
/// `("a", "b/c")` collide. Owners and repository names cannot contain `/`
/// on GitHub, which leaves the title as the only ambiguous field.
pub fn fingerprint(owner: &str, repo: &str, title: &str, issue_number: u64) -> Fingerprint {
    let key = format!("{owner}/{repo}/{title}/{issue_number}");
    Fingerprint(format!("{:x}", Sha256::digest(key.as_bytes())))
}

/// Appends the fingerprint marker to a rendered plan message.
pub fn compose_comment_body(rendered_message: &str, fingerprint: &Fingerprint) -> String {
    format!("{rendered_message}\n{}\n", fingerprint.marker())
}
