//! Configuration loading and management for the payroll engine.
//!
//! This module loads engine settings from a YAML file: the default build
//! mode and monetary rounding for the aggregation engine, and concurrency and
//! retry settings for the dispatch engine.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/engine.yaml").unwrap();
//! println!("Retry attempts: {}", config.dispatch().max_attempts);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    BuildConfig, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_MONEY_SCALE, DispatchConfig, EngineConfig,
};
