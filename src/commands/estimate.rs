use crate::sequence_processor::core::RecordFormat;
use crate::utils::resources::{estimate_chunks, scan_line_stats, SystemResources};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn run(input: PathBuf) -> Result<()> {
    let format = RecordFormat::from_path(&input)?;
    let resources = SystemResources::detect();
    let stats = scan_line_stats(&input)
        .with_context(|| format!("Chunk estimation failed for {}", input.display()))?;
    let estimate = estimate_chunks(&resources, &stats, format.lines_per_record());

    println!("cores:            {}", resources.cores);
    println!("usable RAM:       {} MiB", resources.usable_ram() / (1024 * 1024));
    println!("mem per core:     {:.1} MiB", estimate.mem_per_core_mib);
    println!("avg record bytes: {:.1}", estimate.avg_record_bytes);
    println!("chunk size:       {}", estimate.chunk_size);
    println!("total chunks:     {}", estimate.total_chunks);
    Ok(())
}
