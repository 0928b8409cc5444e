//! User interface module - terminal output for CI logs.
//!
//! Runs are non-interactive; everything here only prints.

use crate::config::Config;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_environment, display_error, display_repositories, display_resolutions,
    display_stage, display_stage_error, display_status, display_success, display_summary,
    display_warning, display_workspace, format_resolutions, format_summary,
};

/// Describes each configured repository on one line.
///
/// # Examples
///
/// ```ignore
/// describe_repositories(&config)
/// // ["PyAutoLens (primary) <- https://github.com/Jammy2211/PyAutoLens.git -> PyAutoLens", ...]
/// ```
pub fn describe_repositories(config: &Config) -> Vec<String> {
    config
        .repositories
        .iter()
        .map(|repo| {
            let role = if repo.primary { " (primary)" } else { "" };
            let branch = repo
                .default_branch
                .as_deref()
                .map(|b| format!(" [{}]", b))
                .unwrap_or_default();
            format!(
                "{}{}{} <- {} -> {}",
                repo.name,
                role,
                branch,
                repo.remote,
                repo.path.display()
            )
        })
        .collect()
}
