//! Dependency installation: run the configured install command once per
//! workspace member.

use tracing::{info, warn};

use crate::config::InstallConfig;
use crate::domain::Workspace;
use crate::environment::Environment;
use crate::error::{Result, WorkspaceError};
use crate::runner::{CommandRunner, CommandSpec};
use crate::warning::PipelineWarning;

/// Install each member's requirements, in workspace order.
///
/// `{requirements}` in the command is replaced by the member's requirements
/// file and `{path}` by the member's checkout path. Members without the
/// requirements file are skipped with a warning. The first non-zero exit
/// aborts the stage.
pub fn install<R: CommandRunner>(
    runner: &R,
    workspace: &Workspace,
    environment: &Environment,
    config: &InstallConfig,
) -> Result<Vec<PipelineWarning>> {
    let mut warnings = Vec::new();
    if config.command.is_empty() {
        return Ok(warnings);
    }

    let (var, value) = environment.to_env_var()?;

    for member in workspace.members() {
        let requirements = member.path.join(&config.requirements_file);
        if !requirements.is_file() {
            warn!(repository = %member.name(), path = %requirements.display(), "no requirements file");
            warnings.push(PipelineWarning::MissingRequirements {
                repository: member.name().to_string(),
                path: requirements,
            });
            continue;
        }

        let argv: Vec<String> = config
            .command
            .iter()
            .map(|arg| {
                arg.replace("{requirements}", &requirements.to_string_lossy())
                    .replace("{path}", &member.path.to_string_lossy())
            })
            .collect();

        let Some(spec) = CommandSpec::from_argv(&argv, &member.path) else {
            continue;
        };
        let spec = spec.with_env(var.clone(), value.clone());

        info!(repository = %member.name(), command = %spec.display(), "installing requirements");
        let exit_code = runner.run(&spec).map_err(|e| WorkspaceError::Installation {
            repository: member.name().to_string(),
            exit_code: failed_to_start(&e),
        })?;

        if exit_code != 0 {
            return Err(WorkspaceError::Installation {
                repository: member.name().to_string(),
                exit_code,
            });
        }
    }

    Ok(warnings)
}

/// Conventional shell status for a command that could not be started
fn failed_to_start(err: &WorkspaceError) -> i32 {
    match err {
        WorkspaceError::Io(io) if io.kind() == std::io::ErrorKind::NotFound => 127,
        _ => 126,
    }
}
