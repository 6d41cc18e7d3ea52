//! Core data models for the payroll engine.
//!
//! All models are immutable value objects. Payslip models are produced by the
//! aggregation engine, dispatch models by the batch sender.

mod dispatch;
mod payslip;

pub use dispatch::{DispatchItemResult, DispatchMode, DispatchResult, DispatchStatus};
pub use payslip::{
    Attendance, BuildMode, BuildWarning, DataSource, PayslipBuildResult, PayslipSummary,
};
