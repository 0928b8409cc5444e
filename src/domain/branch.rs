use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::error::{Result, WorkspaceError};

/// Environment variable holding the source branch of a pull request
pub const HEAD_REF_VAR: &str = "GITHUB_HEAD_REF";
/// Environment variable holding the triggering event's reference
pub const EVENT_REF_VAR: &str = "GITHUB_REF";

static PULL_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^refs/pull/(\d+)/(merge|head)$").expect("pull request ref pattern is valid")
});

/// Name of the branch under test
///
/// Never empty. May contain `/` (e.g. `feature/lensing`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchName(String);

impl BranchName {
    /// Create a branch name from a plain string
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(WorkspaceError::branch("branch name must not be empty"));
        }
        Ok(BranchName(trimmed.to_string()))
    }

    /// Derive the branch under test from a triggering event reference
    ///
    /// Supported forms:
    /// - `refs/heads/<name>` -> `<name>`
    /// - `refs/pull/<n>/merge` or `refs/pull/<n>/head` -> `head_ref`, which is required
    /// - any other non-`refs/` string is taken literally
    ///
    /// A non-empty `head_ref` always wins, as pull request events carry the
    /// source branch there.
    pub fn from_event_ref(event_ref: &str, head_ref: Option<&str>) -> Result<Self> {
        if let Some(head) = head_ref.filter(|h| !h.trim().is_empty()) {
            return BranchName::new(head);
        }

        let event_ref = event_ref.trim();

        if let Some(name) = event_ref.strip_prefix("refs/heads/") {
            return BranchName::new(name);
        }

        if let Some(captures) = PULL_REF_RE.captures(event_ref) {
            let number = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            return Err(WorkspaceError::branch(format!(
                "pull request #{} reference carries no source branch; set {}",
                number, HEAD_REF_VAR
            )));
        }

        if event_ref.starts_with("refs/tags/") {
            return Err(WorkspaceError::branch(format!(
                "'{}' is a tag, not a branch",
                event_ref
            )));
        }

        if event_ref.starts_with("refs/") {
            return Err(WorkspaceError::branch(format!(
                "unsupported event reference '{}'",
                event_ref
            )));
        }

        BranchName::new(event_ref)
    }

    /// Derive the branch under test from the CI environment
    pub fn from_env() -> Result<Self> {
        let head_ref = std::env::var(HEAD_REF_VAR).ok();
        let event_ref = std::env::var(EVENT_REF_VAR).map_err(|_| {
            WorkspaceError::branch(format!(
                "no branch given and neither {} nor {} is set",
                HEAD_REF_VAR, EVENT_REF_VAR
            ))
        })?;

        BranchName::from_event_ref(&event_ref, head_ref.as_deref())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified local reference name
    pub fn local_ref(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
