use std::path::{Path, PathBuf};

use crate::domain::{RepositorySpec, ResolutionResult};

/// A repository materialized inside the workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceMember {
    pub spec: RepositorySpec,
    /// Absolute checkout location
    pub path: PathBuf,
    /// Branch checked out by assembly
    pub default_branch: String,
    /// Branch currently checked out
    pub effective_branch: String,
    /// Assembly reused a checkout already present at `path`
    pub adopted: bool,
}

impl WorkspaceMember {
    pub fn new(spec: RepositorySpec, path: PathBuf, default_branch: impl Into<String>) -> Self {
        let default_branch = default_branch.into();
        WorkspaceMember {
            spec,
            path,
            effective_branch: default_branch.clone(),
            default_branch,
            adopted: false,
        }
    }

    pub fn with_adopted(mut self, adopted: bool) -> Self {
        self.adopted = adopted;
        self
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn is_primary(&self) -> bool {
        self.spec.primary
    }
}

/// The set of checked-out repositories composing one pipeline run
///
/// Treated as a value: stages that change it return a new `Workspace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    members: Vec<WorkspaceMember>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>, members: Vec<WorkspaceMember>) -> Self {
        Workspace {
            root: root.into(),
            members,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All members in configuration order
    pub fn members(&self) -> &[WorkspaceMember] {
        &self.members
    }

    pub fn primary(&self) -> Option<&WorkspaceMember> {
        self.members.iter().find(|m| m.is_primary())
    }

    /// Every member except the primary one, in configuration order
    pub fn dependencies(&self) -> Vec<&WorkspaceMember> {
        self.members.iter().filter(|m| !m.is_primary()).collect()
    }

    pub fn member(&self, name: &str) -> Option<&WorkspaceMember> {
        self.members.iter().find(|m| m.name() == name)
    }

    /// Returns a workspace with each resolved member pinned to its effective branch
    ///
    /// Results naming unknown repositories are ignored.
    pub fn apply(&self, results: &[ResolutionResult]) -> Workspace {
        let members = self
            .members
            .iter()
            .map(|member| {
                let mut member = member.clone();
                if let Some(result) = results.iter().find(|r| r.repository == member.spec.name) {
                    member.effective_branch = result.effective_branch.clone();
                }
                member
            })
            .collect();

        Workspace {
            root: self.root.clone(),
            members,
        }
    }
}
