//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! [`EngineError`] covers configuration and input validation. The remaining
//! types classify failures of the collaborators the engines call through:
//! [`FetchError`] for payroll data sources, [`DeliveryError`] for the delivery
//! channel, and [`BuildFailure`] for the reason a payslip build was rejected.

use std::time::Duration;

use thiserror::Error;

use crate::models::DataSource;

/// The main error type for the payroll engine.
///
/// Returned by configuration loading and by engine entry points that reject
/// their input before doing any work.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but holds a value the engines cannot run with.
    #[error("Invalid configuration value '{field}': {message}")]
    InvalidConfig {
        /// The offending field.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A batch was requested with a concurrency limit below one.
    #[error("Invalid max concurrency {value}: at least one in-flight delivery is required")]
    InvalidConcurrency {
        /// The rejected limit.
        value: usize,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure reported by a payroll data source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The upstream source could not serve the request.
    #[error("source unavailable: {message}")]
    Unavailable {
        /// Upstream description of the failure.
        message: String,
    },

    /// The upstream source did not answer in time.
    #[error("timed out after {elapsed_ms}ms")]
    Timeout {
        /// How long the caller waited.
        elapsed_ms: u64,
    },

    /// The source has no record for the employee.
    #[error("no record for employee {employee_id}")]
    NotFound {
        /// The employee that was looked up.
        employee_id: u32,
    },

    /// The fetch panicked instead of returning.
    #[error("fetch aborted: {message}")]
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
}

/// Failure reported by a delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The channel asked the caller to back off for a server-chosen delay.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay requested by the remote side.
        retry_after: Duration,
    },

    /// A failure that may succeed if retried.
    #[error("transient delivery failure: {message}")]
    Transient {
        /// Upstream description of the failure.
        message: String,
    },

    /// A failure that will not succeed on retry.
    #[error("permanent delivery failure: {message}")]
    Permanent {
        /// Upstream description of the failure.
        message: String,
    },

    /// The channel observed cancellation and gave up.
    #[error("delivery cancelled")]
    Cancelled,
}

/// Why a payslip build was rejected.
///
/// The `Display` output is the build's user-facing error message and always
/// names the data source that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildFailure {
    /// Base salary or attendance could not be fetched.
    #[error("Critical data unavailable: {data_source} fetch failed: {cause}")]
    CriticalFetchFailure {
        /// The critical source that failed.
        data_source: DataSource,
        /// The underlying fetch error.
        cause: FetchError,
    },

    /// An optional source failed while building in strict mode.
    #[error("Optional data unavailable in strict mode: {data_source} fetch failed: {cause}")]
    OptionalFetchFailure {
        /// The optional source that failed.
        data_source: DataSource,
        /// The underlying fetch error.
        cause: FetchError,
    },
}

impl BuildFailure {
    /// Returns the data source that caused the failure.
    pub fn data_source(&self) -> DataSource {
        match self {
            BuildFailure::CriticalFetchFailure { data_source, .. }
            | BuildFailure::OptionalFetchFailure { data_source, .. } => *data_source,
        }
    }
}
