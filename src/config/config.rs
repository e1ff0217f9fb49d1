use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application settings read from `config.toml` in the platform config
/// directory. Every field has a default so a missing or partial file works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_adapters_path")]
    pub adapters_path: PathBuf,
    #[serde(default = "default_thresholds_path")]
    pub thresholds_path: PathBuf,
    #[serde(default = "default_plugin_dir")]
    pub plugin_dir: PathBuf,
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    #[serde(default = "default_sample_records")]
    pub sample_records: usize,
}

fn default_adapters_path() -> PathBuf {
    PathBuf::from("config/adapters.json")
}

fn default_thresholds_path() -> PathBuf {
    PathBuf::from("config/quality.json")
}

fn default_plugin_dir() -> PathBuf {
    PathBuf::from("plugins")
}

fn default_sample_records() -> usize {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adapters_path: default_adapters_path(),
            thresholds_path: default_thresholds_path(),
            plugin_dir: default_plugin_dir(),
            temp_dir: None,
            sample_records: default_sample_records(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("org", "maria", "maria") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                match Self::load_from(&config_path) {
                    Ok(config) => return config,
                    Err(e) => log::warn!(
                        "Ignoring unreadable config {}: {}",
                        config_path.display(),
                        e
                    ),
                }
            }
        }
        Config::default()
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "plugin_dir = \"/opt/maria/plugins\"\nsample_records = 25\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.plugin_dir, PathBuf::from("/opt/maria/plugins"));
        assert_eq!(config.sample_records, 25);
        assert_eq!(config.adapters_path, PathBuf::from("config/adapters.json"));
        assert!(config.temp_dir.is_none());
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "sample_records = \"many\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
