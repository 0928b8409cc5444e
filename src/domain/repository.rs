use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A repository declared in the workspace configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RepositorySpec {
    /// Unique short identifier (e.g. "PyAutoFit")
    pub name: String,
    /// Clone URL or local path of the origin
    pub remote: String,
    /// Checkout destination, relative to the workspace root
    pub path: PathBuf,
    /// Whether this repository's branch and test suite drive the run
    #[serde(default)]
    pub primary: bool,
    /// Branch to check out during assembly; the remote's HEAD when unset
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl RepositorySpec {
    /// Create a dependency repository checked out under its own name
    pub fn new(name: impl Into<String>, remote: impl Into<String>) -> Self {
        let name = name.into();
        RepositorySpec {
            path: PathBuf::from(&name),
            name,
            remote: remote.into(),
            primary: false,
            default_branch: None,
        }
    }

    /// Mark this repository as the primary one
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    /// Pin the branch checked out during assembly
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = Some(branch.into());
        self
    }

    /// Override the checkout destination
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}
