use super::staging::StagingArea;
use crate::error::{CleanError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub artifacts: u64,
    pub bytes: u64,
}

/// Write every staged artifact to `output` in key order, then clear the
/// staging area. On any I/O error the staged artifacts stay where they are.
pub fn merge_staged(staging: &dyn StagingArea, output: &Path) -> Result<MergeSummary> {
    let mut keys = staging.staged_keys()?;
    keys.sort_unstable();

    let merge_err = |e: std::io::Error| CleanError::Merge {
        path: output.to_path_buf(),
        source: e,
    };
    let file = File::create(output).map_err(merge_err)?;
    let mut writer = BufWriter::with_capacity(1 << 20, file);

    let mut summary = MergeSummary::default();
    for key in keys {
        let bytes = staging.read_artifact(key)?;
        writer.write_all(&bytes).map_err(merge_err)?;
        summary.artifacts += 1;
        summary.bytes += bytes.len() as u64;
    }
    writer.flush().map_err(merge_err)?;

    staging.clear()?;
    log::debug!(
        "Merged {} staged records ({} bytes) from {}",
        summary.artifacts,
        summary.bytes,
        staging.describe()
    );
    Ok(summary)
}
