//! Command line workflow

pub mod orchestration;

pub use orchestration::{list_repositories, run_pipeline, PipelineArgs};
