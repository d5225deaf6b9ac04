//! Bridge Configuration
//!
//! Handles parsing and management of ccore.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for by [`BridgeConfig::find_and_load`].
pub const CONFIG_FILE: &str = "ccore.toml";

/// Environment variable that overrides `engine.library`.
pub const LIBRARY_ENV: &str = "CCORE_LIBRARY";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching ccore.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    /// Engine library location
    #[serde(default)]
    pub engine: EngineConfig,
}

impl BridgeConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: BridgeConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), library = %config.engine.library, "loaded config");
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                // Reached root without finding config
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply `CCORE_LIBRARY` if it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(library) = std::env::var(LIBRARY_ENV) {
            if !library.is_empty() {
                self.engine.library = library;
            }
        }
        self
    }
}

/// Where to find the engine shared library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Bare library name (`ccore` -> `libccore.so`) or a path
    #[serde(default = "default_library")]
    pub library: String,

    /// Directories searched before the system paths
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,

    /// Also search the platform's standard library directories
    #[serde(default = "default_true")]
    pub use_system_paths: bool,
}

fn default_library() -> String {
    "ccore".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            search_paths: Vec::new(),
            use_system_paths: true,
        }
    }
}
