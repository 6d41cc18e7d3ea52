//! The payroll data capability consumed by the aggregation engine.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::FetchError;
use crate::models::Attendance;

/// Upstream lookups for the data a payslip is built from.
///
/// Each call is independent, latency-bound and may fail. Implementations
/// must be safe to call concurrently for the same employee.
#[async_trait]
pub trait PayrollDataSource: Send + Sync {
    /// Fetch the employee's base salary for the period.
    async fn fetch_base_salary(&self, employee_id: u32) -> Result<Decimal, FetchError>;

    /// Fetch the employee's paid and overtime hours.
    async fn fetch_attendance(&self, employee_id: u32) -> Result<Attendance, FetchError>;

    /// Fetch the total allowances for the period.
    async fn fetch_allowances(&self, employee_id: u32) -> Result<Decimal, FetchError>;

    /// Fetch the total pre-tax deductions for the period.
    async fn fetch_deductions(&self, employee_id: u32) -> Result<Decimal, FetchError>;

    /// Fetch the tax rate applied to gross pay.
    async fn fetch_tax_rate(&self, employee_id: u32) -> Result<Decimal, FetchError>;
}

#[async_trait]
impl<S: PayrollDataSource + ?Sized> PayrollDataSource for Arc<S> {
    async fn fetch_base_salary(&self, employee_id: u32) -> Result<Decimal, FetchError> {
        (**self).fetch_base_salary(employee_id).await
    }

    async fn fetch_attendance(&self, employee_id: u32) -> Result<Attendance, FetchError> {
        (**self).fetch_attendance(employee_id).await
    }

    async fn fetch_allowances(&self, employee_id: u32) -> Result<Decimal, FetchError> {
        (**self).fetch_allowances(employee_id).await
    }

    async fn fetch_deductions(&self, employee_id: u32) -> Result<Decimal, FetchError> {
        (**self).fetch_deductions(employee_id).await
    }

    async fn fetch_tax_rate(&self, employee_id: u32) -> Result<Decimal, FetchError> {
        (**self).fetch_tax_rate(employee_id).await
    }
}
