//! Fan-out/fan-in payslip aggregation.
//!
//! A build launches the five data fetches concurrently, waits for all of them
//! to settle, then classifies the results:
//!
//! 1. Base salary and attendance are critical. A failure of either rejects the
//!    build in every mode, and is checked before any optional source so it
//!    masks optional warnings.
//! 2. Tax rate, allowances and deductions are optional. In
//!    [`BuildMode::FullStrict`] a failure rejects the build. In
//!    [`BuildMode::PreviewBestEffort`] the value defaults to zero and a
//!    [`BuildWarning`] is recorded.
//!
//! Optional sources are evaluated in the order tax rate, allowances,
//! deductions, which is also the order of the warnings.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BuildConfig;
use crate::error::BuildFailure;
use crate::fetch::{FetchResult, PayrollDataSource, safe_fetch};
use crate::models::{
    Attendance, BuildMode, BuildWarning, DataSource, PayslipBuildResult, PayslipSummary,
};

/// The settled results of one build's fetches.
struct FetchedData {
    base_salary: FetchResult<Decimal>,
    attendance: FetchResult<Attendance>,
    allowances: FetchResult<Decimal>,
    deductions: FetchResult<Decimal>,
    tax_rate: FetchResult<Decimal>,
}

/// Builds payslips by aggregating concurrent lookups against a data source.
///
/// # Example
///
/// ```no_run
/// use payroll_engine::build::PayslipBuilder;
/// use payroll_engine::fetch::PayrollDataSource;
/// use payroll_engine::models::BuildMode;
///
/// async fn preview<S: PayrollDataSource>(source: S) {
///     let builder = PayslipBuilder::new(source);
///     let result = builder.build_payslip(42, BuildMode::PreviewBestEffort).await;
///     for warning in &result.warnings {
///         println!("{}: {}", warning.code, warning.message);
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PayslipBuilder<S> {
    source: S,
    config: BuildConfig,
}

impl<S: PayrollDataSource> PayslipBuilder<S> {
    /// Creates a builder with default settings.
    pub fn new(source: S) -> Self {
        Self::with_config(source, BuildConfig::default())
    }

    /// Creates a builder with the given settings.
    pub fn with_config(source: S, config: BuildConfig) -> Self {
        Self { source, config }
    }

    /// Returns the builder's settings.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Builds a payslip using the configured default mode.
    pub async fn build_default(&self, employee_id: u32) -> PayslipBuildResult {
        self.build_payslip(employee_id, self.config.default_mode)
            .await
    }

    /// Builds the payslip for one employee.
    ///
    /// Never fails as a `Result`: every fetch failure is reported through the
    /// returned [`PayslipBuildResult`]. Wall-clock cost is bounded by the
    /// slowest fetch.
    pub async fn build_payslip(&self, employee_id: u32, mode: BuildMode) -> PayslipBuildResult {
        let build_id = Uuid::new_v4();
        let start_time = Instant::now();
        info!(build_id = %build_id, employee_id, mode = ?mode, "Building payslip");

        let data = self.fetch_all(employee_id).await;

        match self.assemble(employee_id, mode, data) {
            Ok((payslip, warnings)) => {
                let duration_us = elapsed_us(start_time);
                info!(
                    build_id = %build_id,
                    employee_id,
                    net_pay = %payslip.net_pay,
                    warnings = warnings.len(),
                    duration_us,
                    "Payslip built"
                );
                PayslipBuildResult::succeeded(build_id, payslip, warnings, duration_us)
            }
            Err(failure) => {
                let duration_us = elapsed_us(start_time);
                warn!(
                    build_id = %build_id,
                    employee_id,
                    source = %failure.data_source(),
                    error = %failure,
                    "Payslip build failed"
                );
                PayslipBuildResult::failed(build_id, &failure, duration_us)
            }
        }
    }

    /// Launches every fetch at once and waits for all of them to settle.
    async fn fetch_all(&self, employee_id: u32) -> FetchedData {
        let source = &self.source;
        let (base_salary, attendance, allowances, deductions, tax_rate) = tokio::join!(
            safe_fetch(|| source.fetch_base_salary(employee_id)),
            safe_fetch(|| source.fetch_attendance(employee_id)),
            safe_fetch(|| source.fetch_allowances(employee_id)),
            safe_fetch(|| source.fetch_deductions(employee_id)),
            safe_fetch(|| source.fetch_tax_rate(employee_id)),
        );

        FetchedData {
            base_salary,
            attendance,
            allowances,
            deductions,
            tax_rate,
        }
    }

    fn assemble(
        &self,
        employee_id: u32,
        mode: BuildMode,
        data: FetchedData,
    ) -> Result<(PayslipSummary, Vec<BuildWarning>), BuildFailure> {
        let base_salary = require(DataSource::BaseSalary, data.base_salary)?;
        let attendance = require(DataSource::Attendance, data.attendance)?;

        let mut warnings = Vec::new();
        let tax_rate = resolve_optional(DataSource::TaxRate, data.tax_rate, mode, &mut warnings)?;
        let allowances =
            resolve_optional(DataSource::Allowances, data.allowances, mode, &mut warnings)?;
        let deductions =
            resolve_optional(DataSource::Deductions, data.deductions, mode, &mut warnings)?;

        let payslip = PayslipSummary::compute(
            employee_id,
            base_salary,
            attendance,
            allowances,
            deductions,
            tax_rate,
            self.config.money_scale,
        );

        Ok((payslip, warnings))
    }
}

fn require<T>(source: DataSource, fetched: FetchResult<T>) -> Result<T, BuildFailure> {
    fetched
        .into_result()
        .map_err(|cause| BuildFailure::CriticalFetchFailure {
            data_source: source,
            cause,
        })
}

fn resolve_optional(
    source: DataSource,
    fetched: FetchResult<Decimal>,
    mode: BuildMode,
    warnings: &mut Vec<BuildWarning>,
) -> Result<Decimal, BuildFailure> {
    let cause = match fetched.into_result() {
        Ok(value) => return Ok(value),
        Err(cause) => cause,
    };

    match mode {
        BuildMode::FullStrict => Err(BuildFailure::OptionalFetchFailure {
            data_source: source,
            cause,
        }),
        BuildMode::PreviewBestEffort => {
            debug!(source = %source, error = %cause, "Optional source degraded to zero");
            warnings.extend(BuildWarning::degraded(source, &cause));
            Ok(Decimal::ZERO)
        }
    }
}

fn elapsed_us(start_time: Instant) -> u64 {
    u64::try_from(start_time.elapsed().as_micros()).unwrap_or(u64::MAX)
}
