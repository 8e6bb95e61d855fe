//! Server configuration
//!
//! Values come from, in increasing precedence: built-in defaults, an optional
//! TOML file, then command-line flags and environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::inference::{DEFAULT_LIBRARY_PATH, DEFAULT_MODEL_PATH};
use crate::utils::error::{RealWasteError, Result};
use crate::utils::logging::LogLevel;

/// Default request body limit, in bytes (4 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 4 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Shared library implementing the native engine
    pub library_path: PathBuf,
    /// Model file passed to the native engine at startup
    pub model_path: PathBuf,
    /// Maximum accepted request body size
    pub max_upload_bytes: usize,
    /// Minimum log level
    pub log_level: LogLevel,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            library_path: PathBuf::from(DEFAULT_LIBRARY_PATH),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_level: LogLevel::Info,
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub library_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
    pub log_level: Option<LogLevel>,
}

impl ServerConfig {
    /// Load a configuration file; missing keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RealWasteError::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;

        toml::from_str(&content).map_err(|e| {
            RealWasteError::Config(format!("Failed to parse config {}: {e}", path.display()))
        })
    }

    /// Load from `path` if given, otherwise start from defaults, then apply overrides
    pub fn resolve(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Replace every field that has an override
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(library_path) = overrides.library_path {
            self.library_path = library_path;
        }
        if let Some(model_path) = overrides.model_path {
            self.model_path = model_path;
        }
        if let Some(max_upload_bytes) = overrides.max_upload_bytes {
            self.max_upload_bytes = max_upload_bytes;
        }
        if let Some(log_level) = overrides.log_level {
            self.log_level = log_level;
        }
    }

    /// Reject configurations the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(RealWasteError::Config("host must not be empty".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(RealWasteError::Config(
                "max_upload_bytes must be greater than zero".to_string(),
            ));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(RealWasteError::Config("model_path must not be empty".to_string()));
        }
        Ok(())
    }
}
