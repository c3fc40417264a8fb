use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::samples::SampleRequirements;

pub const HOME_ENV: &str = "HUEPRINT_HOME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarmonyConfig {
    #[serde(default)]
    pub sample_requirements: SampleRequirements,
    #[serde(default = "default_log_retention")]
    pub log_retention_count: usize,
    /// Write each log line through immediately instead of on exit
    #[serde(default)]
    pub stream_logs: bool,
}

fn default_log_retention() -> usize {
    10
}

impl Default for HarmonyConfig {
    fn default() -> Self {
        Self {
            sample_requirements: SampleRequirements::default(),
            log_retention_count: 10,
            stream_logs: false,
        }
    }
}

pub struct Config {
    config_path: PathBuf,
    pub data_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Config {
    /// Resolve the data directory from `HUEPRINT_HOME`, falling back to
    /// `.hueprint` under the working directory.
    pub fn new() -> Result<Self> {
        Self::locate(None)
    }

    /// Like [`Config::new`], with an explicit directory taking precedence
    /// over the environment.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        Self::with_dir(resolve_data_dir(explicit))
    }

    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let config_path = data_dir.join("config.json");
        let log_dir = data_dir.join("logs");

        fs::create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

        Ok(Self {
            config_path,
            data_dir,
            log_dir,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<HarmonyConfig> {
        if !self.config_path.exists() {
            return Ok(HarmonyConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .context("Failed to read config file")?;

        let config: HarmonyConfig = serde_json::from_str(&content)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    pub fn save(&self, config: &HarmonyConfig) -> Result<()> {
        let content = serde_json::to_string_pretty(config)
            .context("Failed to serialize config")?;

        fs::write(&self.config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }
}

/// The only place `HUEPRINT_HOME` is read.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(HOME_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(".hueprint"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hueprint-config-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = scratch_dir("defaults");
        let config = Config::with_dir(&dir).unwrap();
        assert!(config.log_dir.is_dir());
        assert_eq!(config.load().unwrap(), HarmonyConfig::default());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_then_load_keeps_changes() {
        let dir = scratch_dir("save");
        let config = Config::with_dir(&dir).unwrap();

        let mut settings = HarmonyConfig::default();
        settings.sample_requirements.skin_zone = 5;
        settings.stream_logs = true;
        config.save(&settings).unwrap();

        assert_eq!(config.load().unwrap(), settings);
        let _ = fs::remove_dir_all(&dir);
    }

    // Only test in the crate that touches HUEPRINT_HOME
    #[test]
    fn explicit_dir_beats_environment() {
        let from_env = scratch_dir("env");
        let explicit = scratch_dir("explicit");
        std::env::set_var(HOME_ENV, &from_env);

        assert_eq!(resolve_data_dir(None), from_env);
        assert_eq!(resolve_data_dir(Some(explicit.clone())), explicit);

        let config = Config::locate(Some(explicit.clone())).unwrap();
        assert_eq!(config.data_dir, explicit);
        assert_eq!(config.log_dir, explicit.join("logs"));

        std::env::remove_var(HOME_ENV);
        assert_eq!(resolve_data_dir(None), PathBuf::from(".hueprint"));
        let _ = fs::remove_dir_all(&explicit);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = scratch_dir("partial");
        let config = Config::with_dir(&dir).unwrap();
        fs::write(config.config_path(), r#"{"sample_requirements":{"eye_color":2}}"#).unwrap();

        let loaded = config.load().unwrap();
        assert_eq!(loaded.sample_requirements.eye_color, 2);
        assert_eq!(loaded.sample_requirements.hair_color, 3);
        assert_eq!(loaded.log_retention_count, 10);
        let _ = fs::remove_dir_all(&dir);
    }
}
