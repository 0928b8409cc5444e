pub mod assembler;
pub mod cli;
pub mod config;
pub mod domain;
pub mod environment;
pub mod error;
pub mod executor;
pub mod git;
pub mod installer;
pub mod pipeline;
pub mod resolver;
pub mod runner;
pub mod telemetry;
pub mod ui;
pub mod warning;

pub use error::{Result, WorkspaceError};
