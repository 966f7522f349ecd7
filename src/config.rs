use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::heap::Growth;

/// Main configuration structure for lockheap
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LockheapConfig {
    /// Defaults for heaps built by the CLI
    #[serde(default)]
    pub heap: HeapConfig,

    /// Defaults for the `stress` command
    #[serde(default)]
    pub stress: StressConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeapConfig {
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,

    /// What to do when an insert finds the heap full: "fixed" or "double"
    #[serde(default)]
    pub growth: Growth,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StressConfig {
    /// Worker threads (0 = one per core)
    #[serde(default)]
    pub threads: usize,

    #[serde(default = "default_inserts_per_thread")]
    pub inserts_per_thread: usize,
}

fn default_initial_capacity() -> usize {
    16
}

fn default_inserts_per_thread() -> usize {
    10_000
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            growth: Growth::default(),
        }
    }
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            inserts_per_thread: default_inserts_per_thread(),
        }
    }
}

impl LockheapConfig {
    /// Load config from custom path or default XDG location
    pub fn load(custom_path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        let path = if let Some(p) = custom_path {
            p.clone()
        } else {
            match Self::default_config_path() {
                Ok(p) => p,
                Err(_) => return Ok(Self::default()),
            }
        };

        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Io(path.clone(), e))?;

        toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.clone(), e))
    }

    /// Get default config path: ~/.config/lockheap/config.toml
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(config_dir.join("lockheap").join("config.toml"))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    NoConfigDir,
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "Could not determine config directory"),
            ConfigError::Io(path, e) => {
                write!(f, "Failed to read config at {}: {}", path.display(), e)
            }
            ConfigError::Parse(path, e) => {
                write!(f, "Failed to parse config at {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
