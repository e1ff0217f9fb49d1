use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Parallel quality cleaning for FASTQ/FASTA reads", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the platform, clean every record and merge in input order
    Clean {
        /// Input .fastq/.fq/.fasta/.fa file, optionally compressed
        #[arg(long = "in")]
        input: PathBuf,

        /// Cleaned output file
        #[arg(long = "out")]
        output: PathBuf,

        /// Comma-separated extension names, run in order
        #[arg(long, default_value = "")]
        plugins: String,

        /// Worker threads (0 = all cores)
        #[arg(long, default_value = "0")]
        threads: usize,

        /// Stage cleaned records on disk regardless of input size
        #[arg(long)]
        disk: bool,

        /// Records per chunk (0 = estimate from the input)
        #[arg(long, default_value = "0")]
        chunk: usize,

        /// Run the extensions on each record before staging
        #[arg(long)]
        preworker: bool,

        /// Write <out>.report.json with run statistics
        #[arg(long)]
        details: bool,

        /// Adapter configuration (overrides config.toml)
        #[arg(long)]
        adapters: Option<PathBuf>,

        /// Threshold configuration (overrides config.toml)
        #[arg(long)]
        thresholds: Option<PathBuf>,

        /// Directory holding extension executables
        #[arg(long)]
        plugin_dir: Option<PathBuf>,

        /// Parent directory for the staging area
        #[arg(long)]
        temp_dir: Option<PathBuf>,
    },

    /// Print the sequencing platform detected from the first records
    Detect {
        #[arg(long = "in")]
        input: PathBuf,

        /// Number of records to sample
        #[arg(long)]
        sample: Option<usize>,
    },

    /// Print the chunk size the cleaner would choose for an input
    Estimate {
        #[arg(long = "in")]
        input: PathBuf,
    },
}
