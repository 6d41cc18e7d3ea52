//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML. Every field has a default, so an empty
//! document is a valid configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::models::{BuildMode, DispatchMode};

/// Default number of decimal places for monetary outputs.
pub const DEFAULT_MONEY_SCALE: u32 = 2;

/// Default number of concurrently in-flight deliveries.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Default number of delivery attempts per target.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 200;

/// Settings for the aggregation engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Mode used when the caller does not choose one.
    pub default_mode: BuildMode,
    /// Decimal places the tax amount is rounded to.
    pub money_scale: u32,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            default_mode: BuildMode::default(),
            money_scale: DEFAULT_MONEY_SCALE,
        }
    }
}

/// Settings for the batch sender and its retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Mode used when the caller does not choose one.
    pub default_mode: DispatchMode,
    /// Upper bound on concurrently in-flight target deliveries.
    pub max_concurrency: usize,
    /// Attempts per target before giving up on retryable failures.
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubled for each later one.
    pub base_delay_ms: u64,
}

impl DispatchConfig {
    /// Returns the base backoff delay.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            default_mode: DispatchMode::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
        }
    }
}

/// The complete engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Aggregation engine settings.
    pub build: BuildConfig,
    /// Dispatch engine settings.
    pub dispatch: DispatchConfig,
}
