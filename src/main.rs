use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

use workspace_ci::cli::{self, PipelineArgs};
use workspace_ci::pipeline::failed_stage;
use workspace_ci::{telemetry, ui, WorkspaceError};

#[derive(clap::Parser)]
#[command(
    name = "workspace-ci",
    version,
    about = "Assemble a multi-repository workspace on matching branches and run its tests"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Branch under test (defaults to the CI event's branch)")]
    branch: Option<String>,

    #[arg(long, help = "Triggering event reference, e.g. refs/heads/feature-x")]
    event_ref: Option<String>,

    #[arg(long, help = "Directory to assemble the workspace in")]
    root: Option<PathBuf>,

    #[arg(long, help = "Resolve branches and compose the environment, then stop")]
    dry_run: bool,

    #[arg(long, help = "Do not install requirements before testing")]
    skip_install: bool,

    #[arg(long, help = "Show configured repositories and exit")]
    list: bool,

    #[arg(long, help = "Emit JSON log lines")]
    json: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    telemetry::init_tracing(args.json, level);

    if args.list {
        cli::list_repositories(args.config.as_deref())?;
        return Ok(());
    }

    let pipeline_args = PipelineArgs {
        config_path: args.config,
        branch: args.branch,
        event_ref: args.event_ref,
        root: args.root,
        dry_run: args.dry_run,
        skip_install: args.skip_install,
    };

    match cli::run_pipeline(pipeline_args) {
        Ok(report) => std::process::exit(report.exit_code()),
        Err(e) => {
            let exit_code = match e.downcast_ref::<WorkspaceError>() {
                Some(err) => {
                    ui::display_stage_error(&failed_stage(err), &err.to_string());
                    err.exit_code()
                }
                None => {
                    ui::display_error(&format!("{:#}", e));
                    1
                }
            };
            std::process::exit(exit_code);
        }
    }
}
