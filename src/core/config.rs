use super::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Engine hyperparameters. Every field has a default so partial JSON files work.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory scanned for rule files at startup.
    pub rules_dir: PathBuf,
    /// Scheduler passes per frame.
    pub iterations: usize,
    /// Scan stride; the anti-bias cycle repeats every `stepping * stepping` passes.
    pub stepping: usize,
    /// Fixed seed for a reproducible run. `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Env-filter directive handed to `setup_logging`.
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            rules_dir: PathBuf::from("./rules"),
            iterations: 4,
            stepping: 2,
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Invalid("iterations must be at least 1"));
        }
        if self.stepping == 0 {
            return Err(ConfigError::Invalid("stepping must be at least 1"));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
