pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod platform;
pub mod plugins;
pub mod quality;
pub mod sequence_processor;
pub mod utils;

pub use error::{CleanError, Result};
pub use pipeline::{run_pipeline, PipelineOptions, RunSummary};
pub use platform::Platform;
