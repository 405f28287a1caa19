//! Source-control binding for a recipe.
//!
//! The recipe declares where its sources come from with `auto` markers;
//! the concrete URL and revision are filled in from the working copy at
//! build time. Resolution is best-effort: if the directory is not a git
//! checkout the markers simply stay `auto`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::Command;

/// Marker for fields resolved from the working copy at build time.
pub const AUTO: &str = "auto";

/// Supported source-control systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScmKind {
    #[default]
    Git,
}

impl std::fmt::Display for ScmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Git => write!(f, "git"),
        }
    }
}

/// Source-control binding (kind, URL, revision).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scm {
    pub kind: ScmKind,
    pub url: String,
    pub revision: String,
}

impl Default for Scm {
    fn default() -> Self {
        Self {
            kind: ScmKind::Git,
            url: AUTO.to_string(),
            revision: AUTO.to_string(),
        }
    }
}

impl Scm {
    /// True if any field still carries the `auto` marker.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        self.url == AUTO || self.revision == AUTO
    }

    /// Resolve `auto` fields from the git checkout at `dir`.
    ///
    /// Fields that cannot be resolved keep their marker; this never
    /// fails.
    #[must_use]
    pub fn resolve(&self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut resolved = self.clone();

        if resolved.url == AUTO {
            if let Some(url) = git_stdout(dir, &["remote", "get-url", "origin"]) {
                resolved.url = url;
            }
        }

        if resolved.revision == AUTO {
            if let Some(rev) = git_stdout(dir, &["rev-parse", "HEAD"]) {
                resolved.revision = rev;
            }
        }

        resolved
    }
}

/// Run git in `dir` and return its trimmed stdout on success.
fn git_stdout(dir: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_is_auto() {
        let scm = Scm::default();
        assert_eq!(scm.kind, ScmKind::Git);
        assert_eq!(scm.url, AUTO);
        assert_eq!(scm.revision, AUTO);
        assert!(scm.is_auto());
    }

    #[test]
    fn resolve_outside_checkout_keeps_markers() {
        let tmp = TempDir::new().unwrap();
        let resolved = Scm::default().resolve(tmp.path());
        // Not a repository (and git may not even be installed); either
        // way resolution must degrade gracefully.
        assert_eq!(resolved.kind, ScmKind::Git);
        assert_eq!(resolved.url, AUTO);
        assert_eq!(resolved.revision, AUTO);
    }

    #[test]
    fn resolve_keeps_explicit_fields() {
        let tmp = TempDir::new().unwrap();
        let scm = Scm {
            kind: ScmKind::Git,
            url: "https://git.example.com/sdk/s5d9_sdk.git".to_string(),
            revision: "deadbeef".to_string(),
        };
        let resolved = scm.resolve(tmp.path());
        assert_eq!(resolved, scm);
    }
}
