use crate::config::{Config, ProfileSet};
use crate::export::{sample_output_quality, RunReport};
use crate::pipeline::{console_sink, run_pipeline, PipelineOptions};
use crate::plugins::{parse_plugin_list, PluginGateway};
use crate::utils::resources::SystemResources;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct CleanArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub plugins: String,
    pub threads: usize,
    pub disk: bool,
    pub chunk: usize,
    pub preworker: bool,
    pub details: bool,
    pub adapters: Option<PathBuf>,
    pub thresholds: Option<PathBuf>,
    pub plugin_dir: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
}

pub fn run(args: CleanArgs) -> Result<()> {
    let config = Config::load();
    let adapters_path = args.adapters.unwrap_or(config.adapters_path);
    let thresholds_path = args.thresholds.unwrap_or(config.thresholds_path);
    let plugin_dir = args.plugin_dir.unwrap_or(config.plugin_dir);

    let profiles = ProfileSet::load(&adapters_path, &thresholds_path)
        .context("Failed to load cleaning configuration")?;
    let gateway = PluginGateway::with_builtins(plugin_dir);
    let resources = SystemResources::detect();
    log::info!(
        "Detected {} cores, {} MiB RAM",
        resources.cores,
        resources.total_ram / (1024 * 1024)
    );

    let options = PipelineOptions {
        input: args.input,
        output: args.output,
        plugins: parse_plugin_list(&args.plugins),
        threads: args.threads,
        chunk_size: args.chunk,
        force_disk: args.disk,
        preworker: args.preworker,
        temp_dir: args.temp_dir.or(config.temp_dir),
        sample_records: config.sample_records,
    };

    let summary = run_pipeline(&options, &profiles, &gateway, &resources, Some(console_sink()?))
        .with_context(|| format!("Cleaning {} failed", options.input.display()))?;

    println!(
        "Cleaned {} records: {} kept, {} rejected, {} malformed -> {} ({:.1}s)",
        summary.stats.processed,
        summary.stats.passed,
        summary.stats.rejected,
        summary.stats.malformed,
        options.output.display(),
        summary.elapsed.as_secs_f64()
    );

    if args.details {
        let quality = sample_output_quality(&options.output, summary.format, options.sample_records)
            .unwrap_or_else(|e| {
                log::warn!("Could not sample output qualities: {:#}", e);
                None
            });
        let report_path = RunReport::default_path(&options.output);
        RunReport::new(&options.input, &options.output, summary)
            .with_output_quality(quality)
            .write(&report_path)?;
        println!("Report written to {}", report_path.display());
    }

    Ok(())
}
