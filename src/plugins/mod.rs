//! Named extensions run either once against the merged output file or
//! against every surviving record before it is staged. Names resolve to
//! statically compiled extensions first, then to executables in the plugin
//! directory. Extension failures are logged and never abort a run.

mod builtin;
mod external;

pub use builtin::{Checksum, CompressFile, StripComment};
pub use external::ExternalExtension;

use crate::sequence_processor::core::{ProcessingStats, Sequence};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Extension '{0}' could not be resolved")]
    NotFound(String),

    #[error("Extension '{name}' has no '{entry}' entry point")]
    MissingEntryPoint { name: String, entry: &'static str },

    #[error("Extension '{name}' failed: {reason}")]
    Failed { name: String, reason: String },

    #[error("Extension '{name}' I/O error: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl PluginError {
    pub fn failed(name: &str, reason: impl Into<String>) -> Self {
        PluginError::Failed {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn io(name: &str, source: std::io::Error) -> Self {
        PluginError::Io {
            name: name.to_string(),
            source,
        }
    }
}

pub trait Extension: Send + Sync {
    fn name(&self) -> &str;

    fn supports_post_merge(&self) -> bool {
        false
    }

    fn supports_records(&self) -> bool {
        false
    }

    /// Post-merge entry point, called with the merged output path.
    fn process(&self, _path: &Path) -> Result<(), PluginError> {
        Err(PluginError::MissingEntryPoint {
            name: self.name().to_string(),
            entry: "process",
        })
    }

    /// Per-record entry point, called before staging.
    fn process_record(&self, _sequence: Sequence) -> Result<Sequence, PluginError> {
        Err(PluginError::MissingEntryPoint {
            name: self.name().to_string(),
            entry: "process_record",
        })
    }
}

/// Split a comma-separated extension list, keeping its order.
pub fn parse_plugin_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExtensionStatus {
    Completed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtensionOutcome {
    pub name: String,
    pub status: ExtensionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub struct PluginGateway {
    registry: HashMap<String, Arc<dyn Extension>>,
    plugin_dir: PathBuf,
}

impl PluginGateway {
    /// A gateway with no compiled extensions; names only resolve to
    /// executables in `plugin_dir`.
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry: HashMap::new(),
            plugin_dir: plugin_dir.into(),
        }
    }

    pub fn with_builtins(plugin_dir: impl Into<PathBuf>) -> Self {
        let mut gateway = Self::new(plugin_dir);
        gateway.register(Arc::new(CompressFile));
        gateway.register(Arc::new(Checksum));
        gateway.register(Arc::new(StripComment));
        gateway
    }

    pub fn register(&mut self, extension: Arc<dyn Extension>) {
        self.registry
            .insert(extension.name().to_string(), extension);
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Extension>, PluginError> {
        if let Some(extension) = self.registry.get(name) {
            return Ok(extension.clone());
        }
        // Plain names only; nothing outside the plugin directory.
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(PluginError::NotFound(name.to_string()));
        }
        let executable = self.plugin_dir.join(name);
        if executable.is_file() {
            return Ok(Arc::new(ExternalExtension::new(name, executable)));
        }
        Err(PluginError::NotFound(name.to_string()))
    }

    /// Run every named extension against the merged file, in list order.
    pub fn run_post_merge(&self, names: &[String], path: &Path) -> Vec<ExtensionOutcome> {
        names
            .iter()
            .map(|name| {
                log::info!("Executing extension: {}", name);
                let result = self.resolve(name).and_then(|extension| {
                    if extension.supports_post_merge() {
                        extension.process(path)
                    } else {
                        Err(PluginError::MissingEntryPoint {
                            name: name.clone(),
                            entry: "process",
                        })
                    }
                });
                outcome(name, result)
            })
            .collect()
    }

    /// Resolve the per-record chain once, before the workers start.
    /// Unresolvable names and extensions without a record entry point are
    /// logged and left out.
    pub fn record_hooks(&self, names: &[String]) -> RecordHooks {
        let mut extensions = Vec::new();
        for name in names {
            match self.resolve(name) {
                Ok(extension) if extension.supports_records() => extensions.push(extension),
                Ok(_) => log::warn!("Extension '{}' has no 'process_record' entry point", name),
                Err(e) => log::warn!("{}", e),
            }
        }
        RecordHooks {
            extensions: Arc::new(extensions),
        }
    }
}

fn outcome(name: &str, result: Result<(), PluginError>) -> ExtensionOutcome {
    match result {
        Ok(()) => ExtensionOutcome {
            name: name.to_string(),
            status: ExtensionStatus::Completed,
            message: None,
        },
        Err(e @ PluginError::NotFound(_)) | Err(e @ PluginError::MissingEntryPoint { .. }) => {
            log::warn!("{}", e);
            ExtensionOutcome {
                name: name.to_string(),
                status: ExtensionStatus::Skipped,
                message: Some(e.to_string()),
            }
        }
        Err(e) => {
            log::warn!("{}", e);
            ExtensionOutcome {
                name: name.to_string(),
                status: ExtensionStatus::Failed,
                message: Some(e.to_string()),
            }
        }
    }
}

/// Ordered per-record extension chain shared by every worker.
#[derive(Clone, Default)]
pub struct RecordHooks {
    extensions: Arc<Vec<Arc<dyn Extension>>>,
}

impl RecordHooks {
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    /// Feed the record through each extension in turn. A failing extension
    /// is skipped for this record and the previous value moves on.
    pub fn apply(&self, sequence: Sequence, stats: &mut ProcessingStats) -> Sequence {
        let mut current = sequence;
        for extension in self.extensions.iter() {
            match extension.process_record(current.clone()) {
                Ok(rewritten) => current = rewritten,
                Err(e) => {
                    log::warn!("{} (record {})", e, current.id);
                    stats.plugin_failures += 1;
                }
            }
        }
        current
    }
}
