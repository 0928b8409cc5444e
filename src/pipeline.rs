//! The five-stage pipeline: assemble, resolve, compose, install, test.
//!
//! Each stage takes the previous stage's typed output; nothing is carried in
//! process-wide state. A fatal error in any stage ends the run and reports
//! its [Stage].

use std::fmt;
use std::path::PathBuf;
use tracing::{info, info_span};

use crate::assembler;
use crate::config::Config;
use crate::domain::{BranchName, ResolutionResult, Workspace};
use crate::environment::{self, Environment};
use crate::error::{Result, WorkspaceError};
use crate::executor;
use crate::git::RepositoryHost;
use crate::installer;
use crate::resolver::BranchResolver;
use crate::runner::CommandRunner;
use crate::warning::PipelineWarning;

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Assemble,
    Resolve,
    Compose,
    Install,
    Test,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Assemble,
        Stage::Resolve,
        Stage::Compose,
        Stage::Install,
        Stage::Test,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Assemble => "assemble",
            Stage::Resolve => "resolve",
            Stage::Compose => "compose",
            Stage::Install => "install",
            Stage::Test => "test",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run-level switches that are not part of the configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Directory the repositories are materialized under
    pub root: PathBuf,
    /// Stop after composing the environment
    pub dry_run: bool,
    pub skip_install: bool,
}

impl PipelineOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PipelineOptions {
            root: root.into(),
            dry_run: false,
            skip_install: false,
        }
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub branch: BranchName,
    pub workspace: Workspace,
    pub resolutions: Vec<ResolutionResult>,
    pub environment: Environment,
    /// `None` for dry runs
    pub test_exit_code: Option<i32>,
    pub warnings: Vec<PipelineWarning>,
}

impl PipelineReport {
    /// Exit status of the whole run
    pub fn exit_code(&self) -> i32 {
        self.test_exit_code.unwrap_or(0)
    }

    pub fn passed(&self) -> bool {
        self.exit_code() == 0
    }
}

/// Receives stage output as soon as each stage completes
///
/// Lets a caller print progress that survives a later stage failing.
pub trait StageObserver {
    fn warning(&self, _warning: &PipelineWarning) {}

    fn resolved(
        &self,
        _branch: &BranchName,
        _workspace: &Workspace,
        _resolutions: &[ResolutionResult],
    ) {
    }

    fn composed(&self, _environment: &Environment) {}
}

/// A configured pipeline bound to its external collaborators
pub struct Pipeline<'a, H, R> {
    config: &'a Config,
    host: &'a H,
    runner: &'a R,
    options: PipelineOptions,
    observer: Option<&'a dyn StageObserver>,
}

impl<'a, H: RepositoryHost, R: CommandRunner> Pipeline<'a, H, R> {
    pub fn new(config: &'a Config, host: &'a H, runner: &'a R, options: PipelineOptions) -> Self {
        Pipeline {
            config,
            host,
            runner,
            options,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn StageObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    fn report_warnings(&self, warnings: &[PipelineWarning]) {
        if let Some(observer) = self.observer {
            warnings.iter().for_each(|w| observer.warning(w));
        }
    }

    /// Run every stage for the branch under test
    pub fn run(&self, branch: &BranchName) -> Result<PipelineReport> {
        self.config.validate()?;
        let mut warnings = Vec::new();

        let workspace = {
            let _span = info_span!("stage", stage = %Stage::Assemble).entered();
            let assembly =
                assembler::assemble(self.host, &self.config.repositories, &self.options.root)?;
            self.report_warnings(&assembly.warnings);
            warnings.extend(assembly.warnings);
            assembly.workspace
        };

        let (workspace, resolutions) = {
            let _span = info_span!("stage", stage = %Stage::Resolve, branch = %branch).entered();
            let resolver = BranchResolver::with_config(self.host, &self.config.resolver);

            let primary = match workspace.primary() {
                Some(primary) => resolver.align_primary(branch, primary)?,
                None => None,
            };
            let resolution = resolver.resolve(branch, &workspace.dependencies())?;
            self.report_warnings(&resolution.warnings);
            warnings.extend(resolution.warnings);

            let mut applied = resolution.results.clone();
            applied.extend(primary);
            let workspace = workspace.apply(&applied);
            if let Some(observer) = self.observer {
                observer.resolved(branch, &workspace, &resolution.results);
            }
            (workspace, resolution.results)
        };

        let environment = {
            let _span = info_span!("stage", stage = %Stage::Compose).entered();
            let environment = environment::compose(
                &workspace,
                &self.config.search_path_var,
                self.config.primary_position,
            )?;
            if let Some(observer) = self.observer {
                observer.composed(&environment);
            }
            environment
        };

        if self.options.dry_run {
            info!("dry run, stopping before install");
            return Ok(PipelineReport {
                branch: branch.clone(),
                workspace,
                resolutions,
                environment,
                test_exit_code: None,
                warnings,
            });
        }

        if !self.options.skip_install {
            let _span = info_span!("stage", stage = %Stage::Install).entered();
            let install_warnings =
                installer::install(self.runner, &workspace, &environment, &self.config.install)?;
            self.report_warnings(&install_warnings);
            warnings.extend(install_warnings);
        }

        let test_exit_code = {
            let _span = info_span!("stage", stage = %Stage::Test).entered();
            executor::run_tests(self.runner, &environment, &self.config.test)?
        };

        Ok(PipelineReport {
            branch: branch.clone(),
            workspace,
            resolutions,
            environment,
            test_exit_code: Some(test_exit_code),
            warnings,
        })
    }
}

/// Stage a failed run stopped at, for diagnostics
pub fn failed_stage(err: &WorkspaceError) -> String {
    err.stage()
        .map(|stage| stage.to_string())
        .unwrap_or_else(|| "setup".to_string())
}
