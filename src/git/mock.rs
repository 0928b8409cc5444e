use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use crate::domain::{BranchName, RepositorySpec, WorkspaceMember};
use crate::error::{Result, WorkspaceError};
use crate::git::{Materialized, RepositoryHost};

/// In-memory state of one remote
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    pub default_branch: String,
    pub branches: HashSet<String>,
    /// Queries and clones fail as if the network were down
    pub unreachable: bool,
    /// Checkouts fail even when the branch exists
    pub broken_checkout: bool,
    /// Materializing finds a checkout already on disk
    pub existing_checkout: bool,
    /// Clones succeed but later branch queries fail
    pub queries_unreachable: bool,
}

impl MockRemote {
    /// A reachable remote whose only branch is `default_branch`
    pub fn new(default_branch: impl Into<String>) -> Self {
        let default_branch = default_branch.into();
        let mut branches = HashSet::new();
        branches.insert(default_branch.clone());
        MockRemote {
            default_branch,
            branches,
            unreachable: false,
            broken_checkout: false,
            existing_checkout: false,
            queries_unreachable: false,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branches.insert(branch.into());
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn broken_checkout(mut self) -> Self {
        self.broken_checkout = true;
        self
    }

    pub fn existing_checkout(mut self) -> Self {
        self.existing_checkout = true;
        self
    }

    pub fn unreachable_queries(mut self) -> Self {
        self.queries_unreachable = true;
        self
    }
}

/// Mock repository host for testing without network or filesystem access
///
/// Remotes are keyed by repository name. Every query and checkout is
/// recorded so tests can assert on what the pipeline did.
#[derive(Debug, Default)]
pub struct MockHost {
    remotes: HashMap<String, MockRemote>,
    queries: Mutex<Vec<(String, String)>>,
    checkouts: Mutex<Vec<(String, String)>>,
}

impl MockHost {
    /// Create a new host with no remotes
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the remote backing repository `name`
    pub fn add_remote(&mut self, name: impl Into<String>, remote: MockRemote) {
        self.remotes.insert(name.into(), remote);
    }

    pub fn with_remote(mut self, name: impl Into<String>, remote: MockRemote) -> Self {
        self.add_remote(name, remote);
        self
    }

    /// `(repository, branch)` pairs passed to `branch_exists`, in call order
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }

    /// `(repository, branch)` pairs successfully checked out, in call order
    pub fn checkouts(&self) -> Vec<(String, String)> {
        self.checkouts.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn remote(&self, name: &str) -> Result<&MockRemote> {
        self.remotes
            .get(name)
            .ok_or_else(|| WorkspaceError::Git(git2::Error::from_str("remote not found")))
    }

    fn record(log: &Mutex<Vec<(String, String)>>, repository: &str, branch: &str) {
        if let Ok(mut entries) = log.lock() {
            entries.push((repository.to_string(), branch.to_string()));
        }
    }
}

fn network_error() -> WorkspaceError {
    WorkspaceError::Git(git2::Error::new(
        git2::ErrorCode::GenericError,
        git2::ErrorClass::Net,
        "failed to connect: network unreachable",
    ))
}

impl RepositoryHost for MockHost {
    fn materialize(&self, spec: &RepositorySpec, _dest: &Path) -> Result<Materialized> {
        let remote = self.remote(&spec.name)?;
        if remote.unreachable {
            return Err(network_error());
        }

        let branch = match &spec.default_branch {
            Some(branch) if remote.branches.contains(branch) => branch.clone(),
            Some(branch) => {
                return Err(WorkspaceError::Git(git2::Error::from_str(&format!(
                    "remote branch '{}' not found",
                    branch
                ))))
            }
            None => remote.default_branch.clone(),
        };

        Ok(Materialized {
            branch,
            adopted: remote.existing_checkout,
        })
    }

    fn branch_exists(&self, member: &WorkspaceMember, branch: &BranchName) -> Result<bool> {
        Self::record(&self.queries, member.name(), branch.as_str());

        let remote = self.remote(member.name())?;
        if remote.unreachable || remote.queries_unreachable {
            return Err(network_error());
        }
        Ok(remote.branches.contains(branch.as_str()))
    }

    fn checkout(&self, member: &WorkspaceMember, branch: &BranchName) -> Result<()> {
        let remote = self.remote(member.name())?;
        if remote.broken_checkout {
            return Err(WorkspaceError::Git(git2::Error::from_str(
                "corrupted reference",
            )));
        }
        if !remote.branches.contains(branch.as_str()) {
            return Err(WorkspaceError::Git(git2::Error::from_str(&format!(
                "remote branch '{}' not found",
                branch
            ))));
        }

        Self::record(&self.checkouts, member.name(), branch.as_str());
        Ok(())
    }
}
