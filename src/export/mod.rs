//! JSON run report written next to the cleaned output with `--details`.

use crate::pipeline::RunSummary;
use crate::quality::mean_quality;
use crate::sequence_processor::core::{RecordFormat, SequenceReader};
use crate::sequence_processor::readers::FastxReader;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::ser::Serializer;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize)]
pub struct RunReport {
    #[serde(rename = "$type")]
    pub record_type: String,
    #[serde(serialize_with = "serialize_datetime")]
    pub created_at: DateTime<Utc>,
    pub tool_version: String,
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub summary: RunSummary,
    pub output_quality: Option<QualitySample>,
}

/// Mean Phred score over the first records of the cleaned output.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QualitySample {
    pub records: usize,
    pub mean_phred: f64,
}

fn serialize_datetime<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.to_rfc3339())
}

impl RunReport {
    pub fn new(input: &Path, output: &Path, summary: RunSummary) -> Self {
        Self {
            record_type: "maria.clean.run".to_string(),
            created_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            summary,
            output_quality: None,
        }
    }

    pub fn with_output_quality(mut self, sample: Option<QualitySample>) -> Self {
        self.output_quality = sample;
        self
    }

    /// `<output>.report.json`
    pub fn default_path(output: &Path) -> PathBuf {
        let mut name = output.as_os_str().to_owned();
        name.push(".report.json");
        PathBuf::from(name)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create report {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        Ok(())
    }
}

/// Average of per-record mean qualities over up to `records` records.
/// Two-line outputs and empty outputs have no quality to report.
pub fn sample_output_quality(
    output: &Path,
    format: RecordFormat,
    records: usize,
) -> Result<Option<QualitySample>> {
    if format != RecordFormat::Fastq || std::fs::metadata(output)?.len() == 0 {
        return Ok(None);
    }
    let mut reader = FastxReader::new(output, format)?;
    let mut total = 0.0;
    let mut count = 0;
    while count < records {
        let Some(sequence) = reader.next_sequence()? else {
            break;
        };
        if let Some(mean) = mean_quality(&sequence.quality) {
            total += mean;
            count += 1;
        }
    }
    Ok((count > 0).then(|| QualitySample {
        records: count,
        mean_phred: total / count as f64,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report_path() {
        assert_eq!(
            RunReport::default_path(Path::new("/tmp/out.fastq")),
            PathBuf::from("/tmp/out.fastq.report.json")
        );
    }

    #[test]
    fn test_sample_output_quality() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.fq");
        // '5' is Phred 20, 'I' is Phred 40.
        std::fs::write(&path, "@a\nACGT\n+\n5555\n@b\nACGT\n+\nIIII\n").unwrap();
        let sample = sample_output_quality(&path, RecordFormat::Fastq, 10)
            .unwrap()
            .unwrap();
        assert_eq!(sample.records, 2);
        assert!((sample.mean_phred - 30.0).abs() < 1e-9);
    }
}
