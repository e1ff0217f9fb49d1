//! Runtime sizing: core count, physical memory and the chunk size that keeps
//! one worker's chunk within a per-thread memory budget.

use crate::sequence_processor::readers::open_decoded;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;
const GIB: u64 = 1024 * MIB;

/// Share of physical memory the run may plan with.
pub const USABLE_RAM_FRACTION: f64 = 0.75;
/// Smallest chunk the estimator will hand out.
pub const MIN_CHUNK_SIZE: usize = 10;
/// Chunks per core above which the floor is raised.
pub const MAX_CHUNKS_PER_CORE: usize = 10;
/// Used when the input cannot be scanned.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SystemResources {
    /// Total physical memory in bytes, 0 when unknown.
    pub total_ram: u64,
    pub cores: usize,
}

impl SystemResources {
    pub fn detect() -> Self {
        let total_ram = total_physical_memory().unwrap_or_else(|| {
            log::warn!("Could not determine total memory; using conservative sizing");
            0
        });
        Self {
            total_ram,
            cores: num_cpus::get().max(1),
        }
    }

    pub fn usable_ram(&self) -> u64 {
        (self.total_ram as f64 * USABLE_RAM_FRACTION) as u64
    }

    pub fn usable_ram_per_core(&self) -> u64 {
        self.usable_ram() / self.cores.max(1) as u64
    }

    /// Coarse memory budget for the chunk one worker holds at a time.
    pub fn target_mem_per_thread(&self) -> u64 {
        let ram = self.total_ram;
        let cores = self.cores;
        if ram <= 4 * GIB && cores <= 4 {
            300 * KIB
        } else if ram <= 8 * GIB && cores <= 4 {
            MIB
        } else if ram > 8 * GIB && cores >= 4 {
            4 * MIB
        } else {
            512 * KIB
        }
    }
}

/// Physical memory in bytes as reported by the OS, `None` when unknown.
fn total_physical_memory() -> Option<u64> {
    let system = System::new_with_specifics(
        RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram()),
    );
    Some(system.total_memory()).filter(|&bytes| bytes > 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineStats {
    pub lines: u64,
    /// Bytes including line terminators.
    pub bytes: u64,
}

impl LineStats {
    pub fn avg_line_bytes(&self) -> f64 {
        if self.lines == 0 {
            0.0
        } else {
            self.bytes as f64 / self.lines as f64
        }
    }
}

/// One pass over the (decoded) input counting lines and bytes.
pub fn scan_line_stats(path: &Path) -> Result<LineStats> {
    let mut reader = open_decoded(path)?;
    let mut stats = LineStats::default();
    let mut line = Vec::with_capacity(1024);
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("Failed to scan {}", path.display()))?;
        if read == 0 {
            break;
        }
        stats.lines += 1;
        stats.bytes += read as u64;
    }
    Ok(stats)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChunkEstimate {
    /// Records per unit of work.
    pub chunk_size: usize,
    pub total_chunks: usize,
    pub avg_record_bytes: f64,
    pub mem_per_core_mib: f64,
    /// Decoded size of the scanned input, `None` when the scan failed.
    pub decoded_bytes: Option<u64>,
}

/// Derive a chunk size from the per-thread budget and the average record
/// size, never below [`MIN_CHUNK_SIZE`] and raised so the total chunk count
/// stays near `cores * MAX_CHUNKS_PER_CORE`.
pub fn estimate_chunks(
    resources: &SystemResources,
    stats: &LineStats,
    lines_per_record: usize,
) -> ChunkEstimate {
    let mem_per_core_mib = resources.usable_ram_per_core() as f64 / MIB as f64;
    let lines_per_record = lines_per_record.max(1);
    let total_records = (stats.lines as usize).div_ceil(lines_per_record);
    let avg_record_bytes = stats.avg_line_bytes() * lines_per_record as f64;

    if total_records == 0 || avg_record_bytes <= 0.0 {
        return ChunkEstimate {
            chunk_size: DEFAULT_CHUNK_SIZE,
            total_chunks: 0,
            avg_record_bytes: 0.0,
            mem_per_core_mib,
            decoded_bytes: Some(stats.bytes),
        };
    }

    let by_budget = (resources.target_mem_per_thread() as f64 / avg_record_bytes) as usize;
    let max_chunks = resources.cores.max(1) * MAX_CHUNKS_PER_CORE;
    let floor = MIN_CHUNK_SIZE.max(total_records.div_ceil(max_chunks));
    let chunk_size = by_budget.max(floor);

    ChunkEstimate {
        chunk_size,
        total_chunks: total_records.div_ceil(chunk_size),
        avg_record_bytes,
        mem_per_core_mib,
        decoded_bytes: Some(stats.bytes),
    }
}

/// Scan the input and estimate a chunk size. An unreadable input is logged
/// and answered with [`DEFAULT_CHUNK_SIZE`].
pub fn auto_estimate_chunks(
    path: &Path,
    lines_per_record: usize,
    resources: &SystemResources,
) -> ChunkEstimate {
    match scan_line_stats(path) {
        Ok(stats) => estimate_chunks(resources, &stats, lines_per_record),
        Err(e) => {
            log::error!("Chunk estimation failed: {:#}", e);
            ChunkEstimate {
                chunk_size: DEFAULT_CHUNK_SIZE,
                total_chunks: 0,
                avg_record_bytes: 0.0,
                mem_per_core_mib: resources.usable_ram_per_core() as f64 / MIB as f64,
                decoded_bytes: None,
            }
        }
    }
}
