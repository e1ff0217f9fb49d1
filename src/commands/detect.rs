use crate::config::Config;
use crate::pipeline::detect_input_platform;
use crate::sequence_processor::core::RecordFormat;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn run(input: PathBuf, sample: Option<usize>) -> Result<()> {
    let config = Config::load();
    let sample = sample.unwrap_or(config.sample_records);
    let format = RecordFormat::from_path(&input)?;
    let platform = detect_input_platform(&input, format, sample)
        .with_context(|| format!("Platform detection failed for {}", input.display()))?;
    println!("{}", platform.display_name());
    Ok(())
}
