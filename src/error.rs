use crate::platform::Platform;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CleanError>;

/// Errors that abort a cleaning run, either before any record is processed
/// or while the pipeline is running.
#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Input file not found: {0}")]
    MissingInput(PathBuf),

    #[error("Unsupported input format '{0}'. Must be .fastq, .fq, .fasta or .fa (optionally compressed)")]
    UnsupportedFormat(String),

    #[error("Failed to read {kind} configuration {path}: {source}")]
    ConfigIo {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {kind} configuration: {reason}")]
    ConfigParse { kind: &'static str, reason: String },

    #[error("No {kind} entry configured for platform {platform}")]
    MissingProfile {
        kind: &'static str,
        platform: Platform,
    },

    #[error("Could not identify the sequencing platform from the first {0} records")]
    PlatformNotIdentified(usize),

    #[error("Failed to read input {path}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stage record at {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Staging key collision for chunk {chunk}, position {position}")]
    KeyCollision { chunk: u64, position: u32 },

    #[error("Staging area is unavailable: {0}")]
    StagingUnavailable(String),

    #[error("Merge failed on {path}: {source}")]
    Merge {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A cleaning worker panicked")]
    WorkerPanicked,

    #[error("Cleaning workers stopped before the input was fully read")]
    WorkersStopped,
}
