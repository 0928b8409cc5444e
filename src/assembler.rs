//! Workspace assembly: materialize every configured repository on its
//! default branch.

use std::path::Path;
use tracing::info;

use crate::domain::{RepositorySpec, Workspace, WorkspaceMember};
use crate::error::{Result, WorkspaceError};
use crate::git::RepositoryHost;
use crate::warning::PipelineWarning;

/// Output of the assembly stage
#[derive(Debug, Clone)]
pub struct Assembly {
    pub workspace: Workspace,
    pub warnings: Vec<PipelineWarning>,
}

/// Materializes each repository under `root`.
///
/// Repositories are retrieved in configuration order. The first failure
/// aborts assembly; there is no partial workspace.
pub fn assemble<H: RepositoryHost>(
    host: &H,
    specs: &[RepositorySpec],
    root: &Path,
) -> Result<Assembly> {
    let mut members = Vec::with_capacity(specs.len());
    let mut warnings = Vec::new();

    for spec in specs {
        let dest = root.join(&spec.path);

        let materialized = host
            .materialize(spec, &dest)
            .map_err(|e| WorkspaceError::assembly(&spec.name, strip_context(e)))?;

        info!(
            repository = %spec.name,
            branch = %materialized.branch,
            adopted = materialized.adopted,
            "materialized"
        );

        if materialized.adopted {
            warnings.push(PipelineWarning::AdoptedCheckout {
                repository: spec.name.clone(),
                path: dest.clone(),
                branch: materialized.branch.clone(),
            });
        }

        members.push(
            WorkspaceMember::new(spec.clone(), dest, materialized.branch)
                .with_adopted(materialized.adopted),
        );
    }

    Ok(Assembly {
        workspace: Workspace::new(root, members),
        warnings,
    })
}

/// Avoids nesting "Cannot assemble" inside itself when the host already
/// produced an assembly error.
fn strip_context(err: WorkspaceError) -> String {
    match err {
        WorkspaceError::Assembly { reason, .. } => reason,
        other => other.to_string(),
    }
}
