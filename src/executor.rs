//! Test execution for the primary repository

use tracing::info;

use crate::config::TestConfig;
use crate::environment::Environment;
use crate::error::{Result, WorkspaceError};
use crate::runner::{CommandRunner, CommandSpec};

/// Run the test command in the primary repository with the composed
/// environment and return its exit code.
pub fn run_tests<R: CommandRunner>(
    runner: &R,
    environment: &Environment,
    config: &TestConfig,
) -> Result<i32> {
    let spec = CommandSpec::from_argv(&config.command, &environment.working_dir)
        .ok_or_else(|| WorkspaceError::test_execution("test command is empty"))?;
    let (var, value) = environment.to_env_var()?;
    let spec = spec.with_env(var, value);

    info!(command = %spec.display(), cwd = %spec.working_dir.display(), "running tests");
    let exit_code = runner
        .run(&spec)
        .map_err(|e| WorkspaceError::test_execution(e.to_string()))?;

    info!(exit_code, "tests finished");
    Ok(exit_code)
}
