use super::context::{EventSink, RunContext, RunEvent, RunPhase};
use super::merge::{merge_staged, MergeSummary};
use super::staging::{DiskStaging, MemoryStaging, StagingArea, StagingMode};
use crate::config::ProfileSet;
use crate::error::{CleanError, Result};
use crate::platform::{detect_platform, Platform};
use crate::plugins::{ExtensionOutcome, ExtensionStatus, PluginGateway, RecordHooks};
use crate::sequence_processor::core::{ProcessingStats, RecordFormat};
use crate::sequence_processor::readers::{
    input_compression, peek_headers, ChunkReader, FastxReader,
};
use crate::sequence_processor::threading::ThreadPool;
use crate::sequence_processor::CleaningProcessor;
use crate::utils::resources::{auto_estimate_chunks, SystemResources};
use niffler::compression::Format;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Everything a cleaning run needs besides the loaded profiles.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Ordered extension names.
    pub plugins: Vec<String>,
    /// Worker count; 0 uses every core.
    pub threads: usize,
    /// Records per chunk; 0 estimates from the input.
    pub chunk_size: usize,
    pub force_disk: bool,
    /// Run the extensions on each record before staging.
    pub preworker: bool,
    pub temp_dir: Option<PathBuf>,
    /// Records sampled for platform detection.
    pub sample_records: usize,
}

impl PipelineOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            plugins: Vec::new(),
            threads: 0,
            chunk_size: 0,
            force_disk: false,
            preworker: false,
            temp_dir: None,
            sample_records: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub platform: Platform,
    pub format: RecordFormat,
    pub chunk_size: usize,
    pub threads: usize,
    pub staging: StagingMode,
    pub stats: ProcessingStats,
    pub merge: MergeSummary,
    pub extensions: Vec<ExtensionOutcome>,
    #[serde(serialize_with = "serialize_duration")]
    pub elapsed: Duration,
}

fn serialize_duration<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

fn input_error(path: &Path, error: anyhow::Error) -> CleanError {
    CleanError::Input {
        path: path.to_path_buf(),
        source: std::io::Error::other(format!("{:#}", error)),
    }
}

/// Classify the platform from the first `sample_records` headers.
pub fn detect_input_platform(
    input: &Path,
    format: RecordFormat,
    sample_records: usize,
) -> Result<Platform> {
    let headers = peek_headers(input, format, sample_records).map_err(|e| input_error(input, e))?;
    detect_platform(&headers).ok_or(CleanError::PlatformNotIdentified(sample_records))
}

/// Detect, clean in parallel, merge in input order, then run the
/// post-merge extensions.
pub fn run_pipeline(
    options: &PipelineOptions,
    profiles: &ProfileSet,
    gateway: &PluginGateway,
    resources: &SystemResources,
    sink: Option<EventSink>,
) -> Result<RunSummary> {
    let mut ctx = RunContext::new(sink);
    let result = run_with_context(&mut ctx, options, profiles, gateway, resources);
    if let Err(e) = &result {
        ctx.emit(RunEvent::Failed {
            error: e.to_string(),
        });
    }
    result
}

fn run_with_context(
    ctx: &mut RunContext,
    options: &PipelineOptions,
    profiles: &ProfileSet,
    gateway: &PluginGateway,
    resources: &SystemResources,
) -> Result<RunSummary> {
    let input = options.input.as_path();
    if !input.is_file() {
        return Err(CleanError::MissingInput(input.to_path_buf()));
    }
    let format = RecordFormat::from_path(input)?;

    let platform = detect_input_platform(input, format, options.sample_records)?;
    ctx.emit(RunEvent::PlatformDetected { platform });
    let profile = Arc::new(profiles.profile(platform)?);

    let compressed =
        input_compression(input).map_err(|e| input_error(input, e))? != Format::No;
    // The decoded size drives staging, so compressed input is always scanned.
    let estimate = if options.chunk_size == 0 || compressed {
        Some(auto_estimate_chunks(input, format.lines_per_record(), resources))
    } else {
        None
    };
    let chunk_size = match estimate {
        Some(estimate) if options.chunk_size == 0 => {
            log::info!(
                "Estimated chunk size {} ({} chunks, {:.1} MiB usable per core)",
                estimate.chunk_size,
                estimate.total_chunks,
                estimate.mem_per_core_mib
            );
            estimate.chunk_size
        }
        _ => options.chunk_size,
    };
    let threads = if options.threads > 0 {
        options.threads
    } else {
        resources.cores.max(1)
    };

    let staged_bytes = match estimate.and_then(|estimate| estimate.decoded_bytes) {
        Some(bytes) => bytes,
        None if !compressed => std::fs::metadata(input)
            .map(|m| m.len())
            .map_err(|e| CleanError::Input {
                path: input.to_path_buf(),
                source: e,
            })?,
        None => u64::MAX,
    };
    let mode = StagingMode::resolve(options.force_disk, staged_bytes, resources.usable_ram());
    let staging: Arc<dyn StagingArea> = match mode {
        StagingMode::Disk => Arc::new(DiskStaging::create(options.temp_dir.as_deref())?),
        StagingMode::Memory => Arc::new(MemoryStaging::new()),
    };
    log::info!(
        "Cleaning {} as {} with {} workers, {} records per chunk, staging in {}",
        input.display(),
        platform.display_name(),
        threads,
        chunk_size,
        staging.describe()
    );

    let hooks = if options.preworker {
        gateway.record_hooks(&options.plugins)
    } else {
        RecordHooks::default()
    };
    let processor = CleaningProcessor::new(profile, hooks);

    ctx.advance_to(RunPhase::ReadingAndWorking);
    let pool = ThreadPool::new(processor, staging.clone(), threads);
    let read_error = feed_pool(ctx, &pool, input, format, chunk_size);

    ctx.advance_to(RunPhase::Draining);
    let stats = pool.finish()?;
    if let Some(e) = read_error {
        return Err(e);
    }
    ctx.emit(RunEvent::WorkersJoined { stats });

    ctx.advance_to(RunPhase::Merging);
    let merge = merge_staged(staging.as_ref(), &options.output)?;
    ctx.emit(RunEvent::Merged {
        artifacts: merge.artifacts,
        bytes: merge.bytes,
    });

    let mut extensions = Vec::new();
    if !options.plugins.is_empty() {
        ctx.advance_to(RunPhase::ExtendingPostMerge);
        extensions = gateway.run_post_merge(&options.plugins, &options.output);
        for outcome in &extensions {
            ctx.emit(RunEvent::ExtensionFinished {
                name: outcome.name.clone(),
                ok: outcome.status == ExtensionStatus::Completed,
            });
        }
    }

    ctx.advance_to(RunPhase::Done);
    Ok(RunSummary {
        platform,
        format,
        chunk_size,
        threads,
        staging: mode,
        stats,
        merge,
        extensions,
        elapsed: ctx.elapsed(),
    })
}

/// Stream chunks into the pool until the input ends or a worker fails.
/// Returns the read error, if any, so the pool can still be joined.
fn feed_pool(
    ctx: &RunContext,
    pool: &ThreadPool,
    input: &Path,
    format: RecordFormat,
    chunk_size: usize,
) -> Option<CleanError> {
    let reader = match FastxReader::new(input, format) {
        Ok(reader) => reader,
        Err(e) => return Some(input_error(input, e)),
    };

    for chunk in ChunkReader::new(reader, chunk_size) {
        if pool.has_failed() {
            break;
        }
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => return Some(input_error(input, e)),
        };
        ctx.emit(RunEvent::ChunkSubmitted {
            index: chunk.index,
            records: chunk.sequences.len(),
        });
        if pool.send(chunk).is_err() {
            break;
        }
    }
    None
}
