//! Pure formatting functions for terminal output.
//!
//! `format_*` functions build strings and are unit tested; `display_*`
//! functions print them.

use console::style;

use crate::domain::{ResolutionResult, Workspace};
use crate::environment::Environment;
use crate::pipeline::Stage;
use crate::warning::PipelineWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a fatal error attributed to a pipeline stage.
pub fn display_stage_error(stage: &str, message: &str) {
    eprintln!(
        "{} {} stage failed: {}",
        style("ERROR:").red(),
        style(stage).bold(),
        message
    );
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Print a stage header.
pub fn display_stage(stage: Stage) {
    println!("\n{}", style(format!("[{}]", stage)).bold());
}

/// Display a non-fatal warning.
pub fn display_warning(warning: &PipelineWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One line per dependency: name, matched marker, effective branch.
pub fn format_resolutions(results: &[ResolutionResult]) -> Vec<String> {
    let width = results
        .iter()
        .map(|r| r.repository.len())
        .max()
        .unwrap_or(0);

    results
        .iter()
        .map(|r| {
            let marker = if r.matched { "matched" } else { "default" };
            format!(
                "{:width$}  {:7}  {}",
                r.repository,
                marker,
                r.effective_branch,
                width = width
            )
        })
        .collect()
}

/// Display the outcome of branch resolution.
pub fn display_resolutions(branch: &str, results: &[ResolutionResult]) {
    println!("Branch under test: {}", style(branch).cyan());
    if results.is_empty() {
        println!("  (no dependencies)");
        return;
    }
    for line in format_resolutions(results) {
        println!("  {}", line);
    }
}

/// Display the composed search path, one entry per line.
pub fn display_environment(environment: &Environment) {
    println!("{}:", style(&environment.var).bold());
    for path in &environment.search_path {
        println!("  {}", path.display());
    }
    println!("Working directory: {}", environment.working_dir.display());
}

/// Display members with their effective branches.
pub fn display_workspace(workspace: &Workspace) {
    println!("Workspace root: {}", workspace.root().display());
    for member in workspace.members() {
        let role = if member.is_primary() { " (primary)" } else { "" };
        println!(
            "  - {}{} @ {}",
            member.name(),
            role,
            member.effective_branch
        );
    }
}

/// Display the repositories declared in configuration.
pub fn display_repositories(lines: &[String]) {
    println!("{}", style("Configured repositories:").bold());
    for line in lines {
        println!("  - {}", line);
    }
}

/// Final line of a run, without styling.
pub fn format_summary(exit_code: Option<i32>) -> String {
    match exit_code {
        None => "Dry run complete; install and test skipped".to_string(),
        Some(0) => "Tests passed".to_string(),
        Some(code) => format!("Tests failed with exit code {}", code),
    }
}

/// Display the final line of a run.
pub fn display_summary(exit_code: Option<i32>) {
    let summary = format_summary(exit_code);
    match exit_code {
        Some(code) if code != 0 => display_error(&summary),
        _ => display_success(&summary),
    }
}
