//! Bridge configuration
//!
//! Settings are read from a TOML file:
//! - `$JSBRIDGE_CONFIG` if set
//! - otherwise `jsbridge.toml` next to the host executable
//!
//! A missing file is created with defaults on first load. Embedders that
//! carry their own settings can use [`BridgeConfig::from_toml_str`] instead.
//!
//! # Example
//!
//! ```ignore
//! use jsbridge_core::BridgeConfig;
//!
//! let config = BridgeConfig::load().unwrap_or_default();
//! jsbridge_core::logging::init(&config);
//! ```

mod loader;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use loader::{config_path, default_config_path, CONFIG_ENV_VAR, CONFIG_FILE_NAME};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// Could not determine where the config file lives
    #[error("Config directory not available - could not resolve executable path")]
    NoConfigDirectory,
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Bridge-wide settings
///
/// Stored in each context by
/// [`install_bindings`](crate::events::install_bindings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Default `tracing` filter; `RUST_LOG` takes precedence
    pub log_level: String,

    /// Let script define ad hoc properties on event objects
    pub allow_expando_properties: bool,

    /// Capacity of the cross-thread dispatch queue
    pub dispatch_queue_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            log_level: "info".to_string(),
            allow_expando_properties: true,
            dispatch_queue_capacity: 1024,
        }
    }
}

impl BridgeConfig {
    /// Load config from file, creating default if missing.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_path()?)
    }

    /// Load config from an explicit path, creating default if missing.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml_str(&content)?;
            tracing::debug!("Loaded bridge config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save_to(path)?;
            tracing::info!("Created default bridge config at {:?}", path);
            Ok(default)
        }
    }

    /// Parse config from TOML text; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Save config to file.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_path()?)
    }

    /// Save config to an explicit path.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved bridge config to {:?}", path);
        Ok(())
    }

    /// Reload config from file.
    pub fn reload(&mut self) -> ConfigResult<()> {
        self.reload_from(&config_path()?)
    }

    /// Reload config from an explicit path.
    pub fn reload_from(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        *self = Self::from_toml_str(&content)?;
        tracing::debug!("Reloaded bridge config from {:?}", path);
        Ok(())
    }
}
