//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{BuildConfig, DispatchConfig, EngineConfig};

/// Loads, validates and provides access to engine configuration.
///
/// # File Format
///
/// ```text
/// build:
///   default_mode: preview_best_effort
///   money_scale: 2
/// dispatch:
///   default_mode: strict_stop_on_failure
///   max_concurrency: 10
///   max_attempts: 3
///   base_delay_ms: 200
/// ```
///
/// Any omitted field takes its default.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/engine.yaml")?;
/// println!("Max concurrency: {}", loader.dispatch().max_concurrency);
/// # Ok::<(), payroll_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified file.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - The file is missing
    /// - The file contains invalid YAML
    /// - A value is out of range (e.g. zero concurrency)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        let loader = Self::parse(&content, &path_str)?;
        debug!(path = %path_str, "Loaded engine configuration");
        Ok(loader)
    }

    /// Parses configuration from an in-memory YAML document.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::from_yaml_str("dispatch:\n  max_concurrency: 4\n").unwrap();
    /// assert_eq!(loader.dispatch().max_concurrency, 4);
    /// assert_eq!(loader.dispatch().max_attempts, 3);
    /// ```
    pub fn from_yaml_str(content: &str) -> EngineResult<Self> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> EngineResult<Self> {
        // An empty document deserializes to unit, not to an empty map.
        let config: EngineConfig = if content.trim().is_empty() {
            EngineConfig::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| EngineError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?
        };

        Self::validate(&config)?;
        Ok(Self { config })
    }

    fn validate(config: &EngineConfig) -> EngineResult<()> {
        if config.dispatch.max_concurrency == 0 {
            return Err(EngineError::InvalidConfig {
                field: "dispatch.max_concurrency".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if config.dispatch.max_attempts == 0 {
            return Err(EngineError::InvalidConfig {
                field: "dispatch.max_attempts".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if config.build.money_scale > 28 {
            return Err(EngineError::InvalidConfig {
                field: "build.money_scale".to_string(),
                message: "must not exceed 28 decimal places".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the aggregation engine settings.
    pub fn build(&self) -> &BuildConfig {
        &self.config.build
    }

    /// Returns the dispatch engine settings.
    pub fn dispatch(&self) -> &DispatchConfig {
        &self.config.dispatch
    }
}
