//! Payslip models produced by the aggregation engine.
//!
//! A build gathers five independent pieces of data per employee, identified by
//! [`DataSource`], and produces a [`PayslipBuildResult`] holding either a
//! finalized [`PayslipSummary`] or an error message.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{BuildFailure, FetchError};

/// How a build treats failures of optional data sources.
///
/// # Example
///
/// ```
/// use payroll_engine::models::BuildMode;
///
/// let mode: BuildMode = serde_yaml::from_str("preview_best_effort").unwrap();
/// assert_eq!(mode, BuildMode::PreviewBestEffort);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    /// Default missing optional values to zero and record a warning.
    PreviewBestEffort,
    /// Reject the build if any source fails.
    #[default]
    FullStrict,
}

/// One of the upstream lookups a payslip build depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// Base salary for the pay period.
    BaseSalary,
    /// Paid and overtime hours.
    Attendance,
    /// Allowances added on top of base salary.
    Allowances,
    /// Deductions taken before tax.
    Deductions,
    /// Tax rate applied to gross pay.
    TaxRate,
}

impl DataSource {
    /// Every source in fetch order.
    pub const ALL: [DataSource; 5] = [
        DataSource::BaseSalary,
        DataSource::Attendance,
        DataSource::Allowances,
        DataSource::Deductions,
        DataSource::TaxRate,
    ];

    /// Returns true if a failure of this source makes any build meaningless.
    pub fn is_critical(self) -> bool {
        matches!(self, DataSource::BaseSalary | DataSource::Attendance)
    }

    /// Machine-readable identifier used in warnings.
    pub fn key(self) -> &'static str {
        match self {
            DataSource::BaseSalary => "base_salary",
            DataSource::Attendance => "attendance",
            DataSource::Allowances => "allowances",
            DataSource::Deductions => "deductions",
            DataSource::TaxRate => "tax_rate",
        }
    }

    /// The warning code recorded when this source is degraded.
    ///
    /// Critical sources are never degraded and have no code.
    pub fn warning_code(self) -> Option<&'static str> {
        match self {
            DataSource::TaxRate => Some("TAX_FETCH_FAILED"),
            DataSource::Allowances => Some("ALLOWANCE_FETCH_FAILED"),
            DataSource::Deductions => Some("DEDUCTION_FETCH_FAILED"),
            DataSource::BaseSalary | DataSource::Attendance => None,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DataSource::BaseSalary => "base salary",
            DataSource::Attendance => "attendance",
            DataSource::Allowances => "allowances",
            DataSource::Deductions => "deductions",
            DataSource::TaxRate => "tax rate",
        };
        f.write_str(label)
    }
}

/// Hours recorded for an employee in the pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Attendance {
    /// Ordinary paid hours.
    pub paid_hours: u32,
    /// Overtime hours.
    pub overtime_hours: u32,
}

/// A degraded optional source recorded on a best-effort build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildWarning {
    /// A code identifying the degraded source (e.g. `TAX_FETCH_FAILED`).
    pub code: String,
    /// The source key (e.g. `tax_rate`).
    pub source: String,
    /// A human-readable description including the fetch error.
    pub message: String,
}

impl BuildWarning {
    /// Creates the warning for an optional source that was defaulted to zero.
    ///
    /// Returns `None` for critical sources, which are never degraded.
    pub fn degraded(source: DataSource, cause: &FetchError) -> Option<Self> {
        let code = source.warning_code()?;
        Some(Self {
            code: code.to_string(),
            source: source.key().to_string(),
            message: format!("{} fetch failed, defaulted to 0: {}", source, cause),
        })
    }
}

/// The finalized monetary summary of a successful build.
///
/// `gross_pay = base_salary + allowances - deductions`,
/// `tax_amount = gross_pay * tax_rate` rounded to the configured scale, and
/// `net_pay = gross_pay - tax_amount`.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{Attendance, PayslipSummary};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let summary = PayslipSummary::compute(
///     7,
///     Decimal::from_str("5000").unwrap(),
///     Attendance { paid_hours: 160, overtime_hours: 4 },
///     Decimal::from_str("300").unwrap(),
///     Decimal::from_str("100").unwrap(),
///     Decimal::from_str("0.2").unwrap(),
///     2,
/// );
/// assert_eq!(summary.gross_pay, Decimal::from_str("5200").unwrap());
/// assert_eq!(summary.tax_amount, Decimal::from_str("1040.00").unwrap());
/// assert_eq!(summary.net_pay, Decimal::from_str("4160.00").unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipSummary {
    /// The employee this payslip belongs to.
    pub employee_id: u32,
    /// Base salary for the period.
    pub base_salary: Decimal,
    /// Ordinary paid hours.
    pub paid_hours: u32,
    /// Overtime hours.
    pub overtime_hours: u32,
    /// Allowances added to base salary.
    pub allowances: Decimal,
    /// Deductions taken before tax.
    pub deductions: Decimal,
    /// Base salary plus allowances minus deductions.
    pub gross_pay: Decimal,
    /// Rate applied to gross pay.
    pub tax_rate: Decimal,
    /// Tax withheld.
    pub tax_amount: Decimal,
    /// Gross pay minus tax.
    pub net_pay: Decimal,
}

impl PayslipSummary {
    /// Computes the derived pay figures from the fetched inputs.
    ///
    /// `money_scale` is the number of decimal places the tax amount is rounded
    /// to, midpoint away from zero.
    pub fn compute(
        employee_id: u32,
        base_salary: Decimal,
        attendance: Attendance,
        allowances: Decimal,
        deductions: Decimal,
        tax_rate: Decimal,
        money_scale: u32,
    ) -> Self {
        let gross_pay = base_salary + allowances - deductions;
        let tax_amount = (gross_pay * tax_rate)
            .round_dp_with_strategy(money_scale, RoundingStrategy::MidpointAwayFromZero);
        let net_pay = gross_pay - tax_amount;

        Self {
            employee_id,
            base_salary,
            paid_hours: attendance.paid_hours,
            overtime_hours: attendance.overtime_hours,
            allowances,
            deductions,
            gross_pay,
            tax_rate,
            tax_amount,
            net_pay,
        }
    }
}

/// The outcome of a single payslip build.
///
/// Exactly one of `payslip` and `error_message` is populated. Warnings are
/// only ever recorded on successful best-effort builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipBuildResult {
    /// Correlation id of this build, also recorded in its log events.
    pub build_id: Uuid,
    /// Whether a payslip was produced.
    pub success: bool,
    /// The payslip, on success.
    pub payslip: Option<PayslipSummary>,
    /// Degraded optional sources, in evaluation order.
    pub warnings: Vec<BuildWarning>,
    /// Why the build failed, on failure.
    pub error_message: Option<String>,
    /// Wall-clock duration of the build in microseconds.
    pub duration_us: u64,
}

impl PayslipBuildResult {
    /// Creates a successful result.
    pub fn succeeded(
        build_id: Uuid,
        payslip: PayslipSummary,
        warnings: Vec<BuildWarning>,
        duration_us: u64,
    ) -> Self {
        Self {
            build_id,
            success: true,
            payslip: Some(payslip),
            warnings,
            error_message: None,
            duration_us,
        }
    }

    /// Creates a failed result carrying the failure's message.
    pub fn failed(build_id: Uuid, failure: &BuildFailure, duration_us: u64) -> Self {
        Self {
            build_id,
            success: false,
            payslip: None,
            warnings: Vec::new(),
            error_message: Some(failure.to_string()),
            duration_us,
        }
    }

    /// Returns true if the build succeeded with at least one degraded source.
    pub fn is_degraded(&self) -> bool {
        self.success && !self.warnings.is_empty()
    }
}
