//! Storage for cleaned records between the workers and the merge.
//!
//! Every surviving record is staged under a [`StageKey`] built from the
//! chunk's sequence index and the record's position inside that chunk. The
//! key is unique for the whole run and its ordering is the input order.

use crate::error::{CleanError, Result};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageKey {
    pub chunk: u64,
    pub position: u32,
}

const FILE_PREFIX: &str = "chunk_";
const FILE_INFIX: &str = "_seq_";
const FILE_SUFFIX: &str = ".tmp";

impl StageKey {
    pub fn new(chunk: u64, position: u32) -> Self {
        Self { chunk, position }
    }

    /// Zero-padded so that lexical and numeric order agree.
    pub fn file_name(&self) -> String {
        format!(
            "{}{:020}{}{:010}{}",
            FILE_PREFIX, self.chunk, FILE_INFIX, self.position, FILE_SUFFIX
        )
    }

    pub fn parse_file_name(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_SUFFIX)?;
        let (chunk, position) = rest.split_once(FILE_INFIX)?;
        Some(Self {
            chunk: chunk.parse().ok()?,
            position: position.parse().ok()?,
        })
    }
}

pub trait StagingArea: Send + Sync {
    /// Store one rendered record. Staging the same key twice is an error.
    fn stage(&self, key: StageKey, bytes: &[u8]) -> Result<()>;

    /// Every staged key, in no particular order.
    fn staged_keys(&self) -> Result<Vec<StageKey>>;

    fn read_artifact(&self, key: StageKey) -> Result<Vec<u8>>;

    /// Drop all staged artifacts and any backing storage.
    fn clear(&self) -> Result<()>;

    fn describe(&self) -> String;
}

/// One file per record in a per-run temporary directory.
pub struct DiskStaging {
    dir: PathBuf,
}

impl DiskStaging {
    /// Create a fresh `maria_clean_chunks*` directory under `base`, or under
    /// the system temp dir. The directory outlives this value so that a
    /// failed run leaves its artifacts behind; [`StagingArea::clear`]
    /// removes it.
    pub fn create(base: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("maria_clean_chunks");
        let temp_dir = match base {
            Some(base) => {
                fs::create_dir_all(base).map_err(|e| CleanError::Staging {
                    path: base.to_path_buf(),
                    source: e,
                })?;
                builder.tempdir_in(base)
            }
            None => builder.tempdir(),
        }
        .map_err(|e| CleanError::StagingUnavailable(e.to_string()))?;

        Ok(Self {
            dir: temp_dir.keep(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl StagingArea for DiskStaging {
    fn stage(&self, key: StageKey, bytes: &[u8]) -> Result<()> {
        let path = self.dir.join(key.file_name());
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(CleanError::KeyCollision {
                    chunk: key.chunk,
                    position: key.position,
                })
            }
            Err(e) => return Err(CleanError::Staging { path, source: e }),
        };
        file.write_all(bytes)
            .map_err(|e| CleanError::Staging { path, source: e })
    }

    fn staged_keys(&self) -> Result<Vec<StageKey>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| CleanError::Merge {
            path: self.dir.clone(),
            source: e,
        })?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CleanError::Merge {
                path: self.dir.clone(),
                source: e,
            })?;
            if let Some(key) = entry.file_name().to_str().and_then(StageKey::parse_file_name) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn read_artifact(&self, key: StageKey) -> Result<Vec<u8>> {
        let path = self.dir.join(key.file_name());
        fs::read(&path).map_err(|e| CleanError::Merge { path, source: e })
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CleanError::Staging {
                path: self.dir.clone(),
                source: e,
            }),
        }
    }

    fn describe(&self) -> String {
        format!("disk ({})", self.dir.display())
    }
}

/// Ordered in-memory map, for inputs that comfortably fit in RAM.
#[derive(Default)]
pub struct MemoryStaging {
    artifacts: Mutex<BTreeMap<StageKey, Vec<u8>>>,
}

impl MemoryStaging {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<StageKey, Vec<u8>>>> {
        self.artifacts
            .lock()
            .map_err(|_| CleanError::StagingUnavailable("in-memory staging lock poisoned".into()))
    }
}

impl StagingArea for MemoryStaging {
    fn stage(&self, key: StageKey, bytes: &[u8]) -> Result<()> {
        let mut artifacts = self.lock()?;
        if artifacts.contains_key(&key) {
            return Err(CleanError::KeyCollision {
                chunk: key.chunk,
                position: key.position,
            });
        }
        artifacts.insert(key, bytes.to_vec());
        Ok(())
    }

    fn staged_keys(&self) -> Result<Vec<StageKey>> {
        Ok(self.lock()?.keys().copied().collect())
    }

    fn read_artifact(&self, key: StageKey) -> Result<Vec<u8>> {
        self.lock()?.get(&key).cloned().ok_or_else(|| {
            CleanError::StagingUnavailable(format!(
                "no artifact for chunk {}, position {}",
                key.chunk, key.position
            ))
        })
    }

    fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum StagingMode {
    Disk,
    Memory,
}

impl StagingMode {
    /// `--disk` always wins. Otherwise stay in memory while the input is no
    /// larger than half of the usable RAM. Unknown RAM means disk.
    pub fn resolve(force_disk: bool, input_bytes: u64, usable_ram: u64) -> Self {
        if force_disk || usable_ram == 0 || input_bytes > usable_ram / 2 {
            StagingMode::Disk
        } else {
            StagingMode::Memory
        }
    }
}
