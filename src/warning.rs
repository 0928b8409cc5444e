use std::fmt;
use std::path::PathBuf;

/// Non-fatal conditions met while running the pipeline.
/// These are reported to the user but never change the exit status.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineWarning {
    /// The destination already held a checkout, which was reused
    AdoptedCheckout {
        repository: String,
        path: PathBuf,
        branch: String,
    },
    /// A branch query failed and the default branch was kept by policy
    QueryFallback {
        repository: String,
        branch: String,
        reason: String,
    },
    /// The repository declares no requirements file; installation skipped
    MissingRequirements { repository: String, path: PathBuf },
}

impl fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineWarning::AdoptedCheckout {
                repository,
                path,
                branch,
            } => write!(
                f,
                "Reusing existing checkout of '{}' at {} (on '{}')",
                repository,
                path.display(),
                branch
            ),
            PipelineWarning::QueryFallback {
                repository,
                branch,
                reason,
            } => write!(
                f,
                "Could not check '{}' for branch '{}' ({}); using its default branch",
                repository, branch, reason
            ),
            PipelineWarning::MissingRequirements { repository, path } => write!(
                f,
                "No requirements file for '{}' at {}; skipping install",
                repository,
                path.display()
            ),
        }
    }
}
