//! Domain types - plain values independent of git and process execution

pub mod branch;
pub mod repository;
pub mod resolution;
pub mod workspace;

pub use branch::BranchName;
pub use repository::RepositorySpec;
pub use resolution::ResolutionResult;
pub use workspace::{Workspace, WorkspaceMember};
