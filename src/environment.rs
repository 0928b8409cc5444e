//! Search path composition
//!
//! Every workspace member is exposed on a single search path variable so
//! imports resolve against the local checkouts rather than any globally
//! installed packages.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::PrimaryPosition;
use crate::domain::Workspace;
use crate::error::{Result, WorkspaceError};

/// Environment handed to the installer and the test executor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Name of the search path variable, e.g. `PYTHONPATH`
    pub var: String,
    /// One entry per workspace member, no duplicates
    pub search_path: Vec<PathBuf>,
    /// Primary repository path, where tests are invoked
    pub working_dir: PathBuf,
}

impl Environment {
    /// Render the variable value, keeping any `existing` value after the
    /// workspace entries.
    pub fn value(&self, existing: Option<OsString>) -> Result<OsString> {
        let existing_entries: Vec<PathBuf> = existing
            .as_deref()
            .map(|value| std::env::split_paths(value).collect())
            .unwrap_or_default();

        std::env::join_paths(self.search_path.iter().chain(existing_entries.iter()))
            .map_err(|e| WorkspaceError::compose(e.to_string()))
    }

    /// `(var, value)` pair ready to pass to a child process, merged with
    /// the current process environment
    pub fn to_env_var(&self) -> Result<(String, OsString)> {
        let existing = std::env::var_os(&self.var).filter(|v| !v.is_empty());
        Ok((self.var.clone(), self.value(existing)?))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.search_path.iter().any(|p| p == path)
    }
}

/// Compose the search path for `workspace`.
///
/// Members keep configuration order; the primary repository goes first or
/// last per `position`. Members that were not switched to the branch under
/// test are included like any other.
pub fn compose(workspace: &Workspace, var: &str, position: PrimaryPosition) -> Result<Environment> {
    let primary = workspace
        .primary()
        .ok_or_else(|| WorkspaceError::compose("workspace has no primary repository"))?;

    let dependencies = workspace.dependencies();
    let mut ordered: Vec<&Path> = Vec::with_capacity(workspace.members().len());
    if position == PrimaryPosition::First {
        ordered.push(&primary.path);
    }
    ordered.extend(dependencies.iter().map(|m| m.path.as_path()));
    if position == PrimaryPosition::Last {
        ordered.push(&primary.path);
    }

    let mut seen = HashSet::new();
    for path in &ordered {
        if !seen.insert(*path) {
            return Err(WorkspaceError::compose(format!(
                "path '{}' appears more than once in the workspace",
                path.display()
            )));
        }
    }

    Ok(Environment {
        var: var.to_string(),
        search_path: ordered.into_iter().map(Path::to_path_buf).collect(),
        working_dir: primary.path.clone(),
    })
}
