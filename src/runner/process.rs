use std::process::Command;
use tracing::debug;

use crate::error::{Result, WorkspaceError};
use crate::runner::{CommandRunner, CommandSpec};

/// Runs commands as child processes with inherited stdio
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        ProcessRunner
    }
}

impl CommandRunner for ProcessRunner {
    /// Execute a command in its working directory
    ///
    /// The command inherits this process's environment, with the variables
    /// from `spec.env` set on top. Output streams straight to the CI log.
    fn run(&self, spec: &CommandSpec) -> Result<i32> {
        if !spec.working_dir.is_dir() {
            return Err(WorkspaceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "working directory not found: {}",
                    spec.working_dir.display()
                ),
            )));
        }

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args).current_dir(&spec.working_dir);

        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        debug!(command = %spec.display(), cwd = %spec.working_dir.display(), "spawning");
        let status = cmd.status().map_err(|e| {
            WorkspaceError::Io(std::io::Error::new(
                e.kind(),
                format!("failed to execute '{}': {}", spec.program, e),
            ))
        })?;

        Ok(status.code().unwrap_or(-1))
    }
}
