use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::RepositorySpec;
use crate::error::{Result, WorkspaceError};

/// File name looked up in the current directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "workspace-ci.toml";

/// Represents the complete configuration for workspace-ci.
///
/// Contains the repositories that make up the workspace, resolver behavior,
/// search path composition and the external install/test commands.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,

    #[serde(default = "default_search_path_var")]
    pub search_path_var: String,

    #[serde(default)]
    pub primary_position: PrimaryPosition,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub repositories: Vec<RepositorySpec>,

    #[serde(default)]
    pub install: InstallConfig,

    #[serde(default)]
    pub test: TestConfig,
}

fn default_search_path_var() -> String {
    "PYTHONPATH".to_string()
}

/// Where the primary repository sits in the composed search path.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryPosition {
    #[default]
    First,
    Last,
}

/// What to do when a branch-existence query cannot reach a remote.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum QueryFailurePolicy {
    /// Abort the run with a resolution error
    #[default]
    Fail,
    /// Keep the default branch and emit a warning
    Fallback,
}

/// Configuration for the branch resolver.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ResolverConfig {
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    #[serde(default)]
    pub on_query_error: QueryFailurePolicy,
}

fn default_parallel() -> bool {
    true
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            parallel: default_parallel(),
            on_query_error: QueryFailurePolicy::default(),
        }
    }
}

/// Configuration for the dependency installer.
///
/// `command` may use `{requirements}` and `{path}` placeholders. An empty
/// command disables the install stage.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InstallConfig {
    #[serde(default = "default_install_command")]
    pub command: Vec<String>,

    #[serde(default = "default_requirements_file")]
    pub requirements_file: String,
}

fn default_install_command() -> Vec<String> {
    vec![
        "pip".to_string(),
        "install".to_string(),
        "-r".to_string(),
        "{requirements}".to_string(),
    ]
}

fn default_requirements_file() -> String {
    "requirements.txt".to_string()
}

impl Default for InstallConfig {
    fn default() -> Self {
        InstallConfig {
            command: default_install_command(),
            requirements_file: default_requirements_file(),
        }
    }
}

/// Configuration for the test executor.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TestConfig {
    #[serde(default = "default_test_command")]
    pub command: Vec<String>,
}

fn default_test_command() -> Vec<String> {
    vec![
        "python".to_string(),
        "-m".to_string(),
        "pytest".to_string(),
    ]
}

impl Default for TestConfig {
    fn default() -> Self {
        TestConfig {
            command: default_test_command(),
        }
    }
}

/// Returns the PyAuto suite: four dependencies and PyAutoLens as primary.
fn default_repositories() -> Vec<RepositorySpec> {
    let suite = [
        ("PyAutoConf", "rhayes777"),
        ("PyAutoFit", "rhayes777"),
        ("PyAutoArray", "Jammy2211"),
        ("PyAutoGalaxy", "Jammy2211"),
        ("PyAutoLens", "Jammy2211"),
    ];

    suite
        .iter()
        .map(|(name, owner)| RepositorySpec {
            name: name.to_string(),
            remote: format!("https://github.com/{}/{}.git", owner, name),
            path: PathBuf::from(*name),
            primary: *name == "PyAutoLens",
            default_branch: None,
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workspace_root: None,
            search_path_var: default_search_path_var(),
            primary_position: PrimaryPosition::default(),
            resolver: ResolverConfig::default(),
            repositories: default_repositories(),
            install: InstallConfig::default(),
            test: TestConfig::default(),
        }
    }
}

impl Config {
    /// Checks the workspace invariants.
    ///
    /// Exactly one repository is primary, names and local paths are unique,
    /// and the test command is non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.repositories.is_empty() {
            return Err(WorkspaceError::config("no repositories configured"));
        }

        let mut names = HashSet::new();
        let mut paths = HashSet::new();
        for repo in &self.repositories {
            if repo.name.trim().is_empty() {
                return Err(WorkspaceError::config("repository name must not be empty"));
            }
            if repo.remote.trim().is_empty() {
                return Err(WorkspaceError::config(format!(
                    "repository '{}' has no remote",
                    repo.name
                )));
            }
            if !names.insert(repo.name.as_str()) {
                return Err(WorkspaceError::config(format!(
                    "duplicate repository name '{}'",
                    repo.name
                )));
            }
            if !paths.insert(repo.path.as_path()) {
                return Err(WorkspaceError::config(format!(
                    "duplicate repository path '{}'",
                    repo.path.display()
                )));
            }
        }

        let primaries = self.repositories.iter().filter(|r| r.primary).count();
        if primaries != 1 {
            return Err(WorkspaceError::config(format!(
                "exactly one repository must be primary, found {}",
                primaries
            )));
        }

        if self.search_path_var.trim().is_empty() {
            return Err(WorkspaceError::config("search_path_var must not be empty"));
        }

        if self.test.command.is_empty() {
            return Err(WorkspaceError::config("test command must not be empty"));
        }

        Ok(())
    }

    /// The primary repository, if exactly one is configured.
    pub fn primary(&self) -> Option<&RepositorySpec> {
        let mut primaries = self.repositories.iter().filter(|r| r.primary);
        match (primaries.next(), primaries.next()) {
            (Some(primary), None) => Some(primary),
            _ => None,
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `workspace-ci.toml` in current directory
/// 3. `workspace-ci.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parses a TOML configuration string.
pub fn parse_config(config_str: &str) -> Result<Config> {
    toml::from_str(config_str).map_err(|e| WorkspaceError::config(e.to_string()))
}
