use crate::error::{CleanError, Result};
use crate::platform::Platform;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Per-platform acceptance limits, as written in the threshold file:
/// `{"threshold": 20, "minbases": 50, "homopolymer": 0, "maxBadBases": 5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityThresholds {
    #[serde(rename = "threshold")]
    pub min_phred_score: u8,
    #[serde(rename = "minbases")]
    pub min_bases: usize,
    /// Longest allowed single-base run; 0 disables the check.
    #[serde(rename = "homopolymer", default)]
    pub max_homopolymer_run: usize,
    #[serde(rename = "maxBadBases")]
    pub max_bad_bases: usize,
}

/// Adapters and thresholds selected for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub adapters: Vec<String>,
    pub thresholds: QualityThresholds,
}

/// Both configuration maps, keyed by platform. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct ProfileSet {
    adapters: HashMap<Platform, Vec<String>>,
    thresholds: HashMap<Platform, QualityThresholds>,
}

impl ProfileSet {
    pub fn load(adapters_path: &Path, thresholds_path: &Path) -> Result<Self> {
        let adapters = read_config("adapter", adapters_path)?;
        let thresholds = read_config("threshold", thresholds_path)?;
        Self::from_json(&adapters, &thresholds)
    }

    pub fn from_json(adapters: &str, thresholds: &str) -> Result<Self> {
        let adapters: HashMap<String, Vec<String>> = parse_config("adapter", adapters)?;
        let thresholds: HashMap<String, QualityThresholds> = parse_config("threshold", thresholds)?;

        Ok(Self {
            adapters: key_by_platform("adapter", adapters)?,
            thresholds: key_by_platform("threshold", thresholds)?,
        })
    }

    pub fn profile(&self, platform: Platform) -> Result<PlatformProfile> {
        let adapters = self
            .adapters
            .get(&platform)
            .ok_or(CleanError::MissingProfile {
                kind: "adapter",
                platform,
            })?;
        let thresholds = self
            .thresholds
            .get(&platform)
            .ok_or(CleanError::MissingProfile {
                kind: "threshold",
                platform,
            })?;

        Ok(PlatformProfile {
            platform,
            adapters: adapters.clone(),
            thresholds: *thresholds,
        })
    }
}

fn read_config(kind: &'static str, path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| CleanError::ConfigIo {
        kind,
        path: path.to_path_buf(),
        source,
    })
}

fn parse_config<T: serde::de::DeserializeOwned>(kind: &'static str, content: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| CleanError::ConfigParse {
        kind,
        reason: e.to_string(),
    })
}

fn key_by_platform<T>(kind: &'static str, map: HashMap<String, T>) -> Result<HashMap<Platform, T>> {
    let mut keyed = HashMap::with_capacity(map.len());
    for (name, value) in map {
        let platform = name
            .parse::<Platform>()
            .map_err(|reason| CleanError::ConfigParse { kind, reason })?;
        if keyed.insert(platform, value).is_some() {
            return Err(CleanError::ConfigParse {
                kind,
                reason: format!("more than one entry for platform {}", platform),
            });
        }
    }
    Ok(keyed)
}
