//! Service configuration
//!
//! ## Configuration Resolution
//!
//! 1. Embedded defaults (`config/finlight.toml`, compiled into the binary)
//! 2. Override file: explicit path, else ~/.local/share/finlight/config.toml
//! 3. Environment variables (`FINLIGHT_MODEL_DIR`, `FINLIGHT_MIN_FEEDBACK`,
//!    `FINLIGHT_HOST`, `FINLIGHT_PORT`)
//!
//! Later layers win. Override files may be partial; missing keys keep their
//! default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/finlight.toml");

/// Minimum usable feedback rows before a retrain is attempted
pub const DEFAULT_MIN_FEEDBACK: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub model_dir: PathBuf,
    pub model_file: String,
    pub feedback_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            model_file: "categorizer_model.json".to_string(),
            feedback_file: "feedback.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrainConfig {
    pub min_feedback: usize,
}

impl Default for RetrainConfig {
    fn default() -> Self {
        Self {
            min_feedback: DEFAULT_MIN_FEEDBACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            allowed_origins: vec![],
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub storage: StorageConfig,
    pub retrain: RetrainConfig,
    pub server: ServerSettings,
}

impl ServiceConfig {
    /// Resolve configuration from defaults, an override file, and the environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_file_or_default(override_path)?;
        config.apply_env_from(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Configuration rooted at a given storage directory (for tests and tools)
    pub fn with_model_dir(model_dir: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.storage.model_dir = model_dir.into();
        config
    }

    fn from_file_or_default(override_path: Option<&Path>) -> Result<Self> {
        let path = match override_path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        match path {
            Some(p) if p.exists() => {
                let content = fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", p.display(), e))
                })?;
                debug!(path = %p.display(), "Loaded config override");
                Self::parse(&content)
            }
            Some(p) => {
                warn!(path = %p.display(), "Config file not found, using defaults");
                Self::parse(DEFAULT_CONFIG)
            }
            None => Self::parse(DEFAULT_CONFIG),
        }
    }

    /// Parse a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("FINLIGHT_MODEL_DIR").filter(|s| !s.is_empty()) {
            self.storage.model_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("FINLIGHT_MIN_FEEDBACK") {
            match raw.trim().parse() {
                Ok(n) => self.retrain.min_feedback = n,
                Err(_) => warn!(value = %raw, "Ignoring invalid FINLIGHT_MIN_FEEDBACK"),
            }
        }
        if let Some(host) = lookup("FINLIGHT_HOST").filter(|s| !s.is_empty()) {
            self.server.host = host;
        }
        if let Some(raw) = lookup("FINLIGHT_PORT") {
            match raw.trim().parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %raw, "Ignoring invalid FINLIGHT_PORT"),
            }
        }
    }

    /// Path of the persisted classifier artifact
    pub fn model_path(&self) -> PathBuf {
        self.storage.model_dir.join(&self.storage.model_file)
    }

    /// Path of the feedback log
    pub fn feedback_path(&self) -> PathBuf {
        self.storage.model_dir.join(&self.storage.feedback_file)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finlight").join("config.toml"))
}
