use thiserror::Error;

use crate::pipeline::Stage;

/// Unified error type for workspace-ci operations
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Cannot assemble repository '{repository}': {reason}")]
    Assembly { repository: String, reason: String },

    #[error("Cannot determine whether '{repository}' has branch '{branch}': {reason}")]
    ResolutionAmbiguous {
        repository: String,
        branch: String,
        reason: String,
    },

    #[error("Cannot switch '{repository}' to branch '{branch}': {reason}")]
    CheckoutSwitch {
        repository: String,
        branch: String,
        reason: String,
    },

    #[error("Environment composition error: {0}")]
    Compose(String),

    #[error("Installing requirements for '{repository}' failed with exit code {exit_code}")]
    Installation { repository: String, exit_code: i32 },

    #[error("Test execution error: {0}")]
    TestExecution(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in workspace-ci
pub type Result<T> = std::result::Result<T, WorkspaceError>;

impl WorkspaceError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        WorkspaceError::Config(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        WorkspaceError::Branch(msg.into())
    }

    /// Create an assembly error for a repository
    pub fn assembly(repository: impl Into<String>, reason: impl ToString) -> Self {
        WorkspaceError::Assembly {
            repository: repository.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a composition error with context
    pub fn compose(msg: impl Into<String>) -> Self {
        WorkspaceError::Compose(msg.into())
    }

    /// Create a test execution error with context
    pub fn test_execution(msg: impl Into<String>) -> Self {
        WorkspaceError::TestExecution(msg.into())
    }

    /// The pipeline stage this error aborts, if it belongs to one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            WorkspaceError::Assembly { .. } => Some(Stage::Assemble),
            WorkspaceError::ResolutionAmbiguous { .. } | WorkspaceError::CheckoutSwitch { .. } => {
                Some(Stage::Resolve)
            }
            WorkspaceError::Compose(_) => Some(Stage::Compose),
            WorkspaceError::Installation { .. } => Some(Stage::Install),
            WorkspaceError::TestExecution(_) => Some(Stage::Test),
            _ => None,
        }
    }

    /// Process exit code reported when this error terminates a run.
    ///
    /// Installer failures are surfaced verbatim; everything else is `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            WorkspaceError::Installation { exit_code, .. } if *exit_code != 0 => *exit_code,
            _ => 1,
        }
    }
}
