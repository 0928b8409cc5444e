//! External command execution
//!
//! The installer and the test executor hand their work to a
//! [CommandRunner]:
//! - [process::ProcessRunner] spawns real child processes
//! - [recording::RecordingRunner] records invocations for tests

pub mod process;
pub mod recording;

pub use process::ProcessRunner;
pub use recording::RecordingRunner;

use std::ffi::OsString;
use std::path::PathBuf;

use crate::error::Result;

/// A fully specified command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Variables set on top of the inherited environment
    pub env: Vec<(String, OsString)>,
}

impl CommandSpec {
    /// Build a spec from an argv-style list
    ///
    /// Returns `None` for an empty list.
    pub fn from_argv(argv: &[String], working_dir: impl Into<PathBuf>) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(CommandSpec {
            program: program.clone(),
            args: args.to_vec(),
            working_dir: working_dir.into(),
            env: Vec::new(),
        })
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Shell-like rendering for logs and diagnostics
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs commands to completion
pub trait CommandRunner: Send + Sync {
    /// Run `spec` and wait for it
    ///
    /// # Returns
    /// * `Ok(code)` - The process ran; `code` is its exit status
    ///   (`-1` when terminated by a signal)
    /// * `Err` - The process could not be started
    fn run(&self, spec: &CommandSpec) -> Result<i32>;
}
