use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Result, WorkspaceError};
use crate::runner::{CommandRunner, CommandSpec};

/// Command runner that records invocations instead of spawning processes
///
/// Exit codes are scripted per program name; unscripted programs exit `0`.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    exit_codes: HashMap<String, i32>,
    unspawnable: Vec<String>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every invocation of `program` exit with `code`
    pub fn with_exit_code(mut self, program: impl Into<String>, code: i32) -> Self {
        self.exit_codes.insert(program.into(), code);
        self
    }

    /// Make every invocation of `program` fail to start
    pub fn with_unspawnable(mut self, program: impl Into<String>) -> Self {
        self.unspawnable.push(program.into());
        self
    }

    /// Invocations so far, in call order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<i32> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }

        if self.unspawnable.contains(&spec.program) {
            return Err(WorkspaceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("failed to execute '{}'", spec.program),
            )));
        }

        Ok(self.exit_codes.get(&spec.program).copied().unwrap_or(0))
    }
}
