//! Main workflow orchestration logic
//!
//! Connects parsed command line arguments to the pipeline: picks the branch
//! under test, loads configuration, wires the libgit2 host and the process
//! runner, and prints progress for the CI log.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::config::{self, Config};
use crate::domain::branch::HEAD_REF_VAR;
use crate::domain::{BranchName, ResolutionResult, Workspace};
use crate::environment::Environment;
use crate::git::Git2Host;
use crate::pipeline::{Pipeline, PipelineOptions, PipelineReport, Stage, StageObserver};
use crate::runner::ProcessRunner;
use crate::ui;
use crate::warning::PipelineWarning;

/// Arguments for the pipeline workflow
///
/// Mirrors the CLI Args but in a format suitable for orchestration logic.
/// This decoupling allows the workflow to be called programmatically
/// without depending on clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineArgs {
    /// Path to custom config file
    pub config_path: Option<String>,

    /// Explicit branch under test
    pub branch: Option<String>,

    /// Triggering event reference, e.g. `refs/heads/feature-x`
    pub event_ref: Option<String>,

    /// Workspace root override
    pub root: Option<PathBuf>,

    /// Stop after composing the environment
    pub dry_run: bool,

    /// Skip the install stage
    pub skip_install: bool,
}

/// Pick the branch under test.
///
/// Precedence: explicit branch, event reference, then the CI environment.
/// A pull request head ref from the environment still names the branch
/// behind an explicit `refs/pull/...` event reference.
pub fn select_branch(args: &PipelineArgs) -> crate::Result<BranchName> {
    if let Some(branch) = &args.branch {
        return BranchName::new(branch.as_str());
    }
    if let Some(event_ref) = &args.event_ref {
        let head_ref = std::env::var(HEAD_REF_VAR).ok();
        return BranchName::from_event_ref(event_ref, head_ref.as_deref());
    }
    BranchName::from_env()
}

/// Prints each stage's output to the CI log as soon as it is available
struct ConsoleObserver;

impl StageObserver for ConsoleObserver {
    fn warning(&self, warning: &PipelineWarning) {
        ui::display_warning(warning);
    }

    fn resolved(&self, branch: &BranchName, workspace: &Workspace, resolutions: &[ResolutionResult]) {
        ui::display_stage(Stage::Resolve);
        ui::display_resolutions(branch.as_str(), resolutions);
        ui::display_workspace(workspace);
    }

    fn composed(&self, environment: &Environment) {
        ui::display_stage(Stage::Compose);
        ui::display_environment(environment);
    }
}

/// Workspace root: CLI override, then configuration, then the current directory
pub fn workspace_root(args: &PipelineArgs, config: &Config) -> Result<PathBuf> {
    let root = match (&args.root, &config.workspace_root) {
        (Some(root), _) => root.clone(),
        (None, Some(root)) => root.clone(),
        (None, None) => PathBuf::from("."),
    };

    std::fs::create_dir_all(&root)
        .with_context(|| format!("cannot create workspace root {}", root.display()))?;
    root.canonicalize()
        .with_context(|| format!("cannot resolve workspace root {}", root.display()))
}

/// Main pipeline workflow
///
/// Orchestrates one run:
/// 1. Load and validate configuration
/// 2. Determine the branch under test
/// 3. Run assemble, resolve, compose, install, test
/// 4. Print the resolution table and search path as their stages complete,
///    then the result
///
/// # Returns
///
/// The run report. Fatal pipeline errors are returned as
/// [crate::error::WorkspaceError] inside the `anyhow::Error`, so callers can
/// recover the failing stage and exit code.
pub fn run_pipeline(args: PipelineArgs) -> Result<PipelineReport> {
    let config = config::load_config(args.config_path.as_deref())?;
    config.validate()?;

    let branch = select_branch(&args)?;
    let root = workspace_root(&args, &config)?;

    ui::display_status(&format!(
        "Testing branch '{}' across {} repositories in {}",
        branch,
        config.repositories.len(),
        root.display()
    ));

    let options = PipelineOptions {
        root,
        dry_run: args.dry_run,
        skip_install: args.skip_install,
    };

    let host = Git2Host::new();
    let runner = ProcessRunner::new();
    let report = Pipeline::new(&config, &host, &runner, options)
        .with_observer(&ConsoleObserver)
        .run(&branch)?;

    ui::display_summary(report.test_exit_code);
    Ok(report)
}

/// Print configured repositories
pub fn list_repositories(config_path: Option<&str>) -> Result<()> {
    let config = config::load_config(config_path)?;
    ui::display_repositories(&ui::describe_repositories(&config));
    Ok(())
}
