//! Repository host abstraction layer
//!
//! This module provides a trait-based abstraction over the version control
//! operations the pipeline needs, allowing the resolver and assembler to run
//! against real remotes or against an in-memory mock.
//!
//! # Overview
//!
//! The primary abstraction is the [RepositoryHost] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Host]: A real implementation using the `git2` crate
//! - [mock::MockHost]: A mock implementation for testing
//!
//! # Usage
//!
//! ```rust
//! # use workspace_ci::git::RepositoryHost;
//! # use workspace_ci::domain::{BranchName, WorkspaceMember};
//! # fn example<H: RepositoryHost>(host: &H, member: &WorkspaceMember) -> workspace_ci::Result<()> {
//! let branch = BranchName::new("feature-x")?;
//! if host.branch_exists(member, &branch)? {
//!     host.checkout(member, &branch)?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{MockHost, MockRemote};
pub use repository::Git2Host;

use std::path::Path;

use crate::domain::{BranchName, RepositorySpec, WorkspaceMember};
use crate::error::Result;

/// Result of materializing one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// The branch checked out (`HEAD` when detached)
    pub branch: String,
    /// Whether an existing checkout was reused instead of cloning
    pub adopted: bool,
}

/// Version control operations used by the pipeline
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync`: the resolver queries dependencies
/// from several threads at once.
///
/// ## Error Handling
///
/// Implementations return their native failure (usually
/// [crate::error::WorkspaceError::Git]); callers attach the stage-specific
/// context.
pub trait RepositoryHost: Send + Sync {
    /// Materialize a repository at `dest` on its default branch
    ///
    /// If `dest` already holds a checkout of the repository it is adopted
    /// as-is.
    ///
    /// # Returns
    /// * `Ok(Materialized)` - Branch checked out and whether it was adopted
    /// * `Err` - If the remote cannot be retrieved
    fn materialize(&self, spec: &RepositorySpec, dest: &Path) -> Result<Materialized>;

    /// Whether the member's remote has a branch literally named `branch`
    ///
    /// # Returns
    /// * `Ok(true)` / `Ok(false)` - Definitive answer from the remote
    /// * `Err` - The remote could not be queried; absence is NOT implied
    fn branch_exists(&self, member: &WorkspaceMember, branch: &BranchName) -> Result<bool>;

    /// Switch the member's checkout to the remote branch `branch`
    fn checkout(&self, member: &WorkspaceMember, branch: &BranchName) -> Result<()>;
}
