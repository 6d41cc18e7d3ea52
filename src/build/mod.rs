//! The aggregation engine.
//!
//! Builds a payslip for one employee from independent concurrent fetches,
//! tolerating optional-source failures according to a [`BuildMode`].
//!
//! [`BuildMode`]: crate::models::BuildMode

mod payslip_builder;

pub use payslip_builder::PayslipBuilder;
