//! Configuration module for Gridboard
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`GRIDBOARD_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use gridboard::config::GridboardConfig;
//!
//! // Load defaults
//! let config = GridboardConfig::default();
//! assert_eq!(config.engine.columns, 3);
//!
//! // Parse from TOML
//! let toml = r#"
//! [engine]
//! columns = 4
//! "#;
//! let config: GridboardConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.engine.columns, 4);
//! ```

pub mod engine;
pub mod error;
pub mod logging;

pub use engine::EngineConfig;
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::layout::GridLayout;

/// Unified configuration for the Gridboard engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GridboardConfig {
    /// Grid and startup settings
    pub engine: EngineConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl GridboardConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supports GRIDBOARD_* environment variables for common settings.
    /// Invalid values are silently ignored (defaults are kept).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(columns) = std::env::var("GRIDBOARD_COLUMNS") {
            if let Ok(c) = columns.parse() {
                self.engine.columns = c;
            }
        }
        if let Ok(dashboard) = std::env::var("GRIDBOARD_DASHBOARD") {
            self.engine.dashboard = Some(dashboard.into());
        }

        if let Ok(level) = std::env::var("GRIDBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("GRIDBOARD_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.columns == 0 || self.engine.columns > GridLayout::MAX_COLUMNS {
            return Err(ConfigError::Validation {
                field: "engine.columns".to_string(),
                message: format!("columns must be between 1 and {}", GridLayout::MAX_COLUMNS),
            });
        }
        Ok(())
    }
}
