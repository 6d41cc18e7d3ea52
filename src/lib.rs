//! Payslip aggregation and batch dispatch engine.
//!
//! This crate provides the two concurrent engines of a payroll run: the
//! [`build`] engine, which assembles a payslip from several independent,
//! fallible upstream lookups, and the [`dispatch`] engine, which delivers to
//! many targets under bounded concurrency with per-target retry and
//! cooperative cancellation. Upstream systems are reached only through the
//! [`fetch::PayrollDataSource`] and [`dispatch::DeliveryChannel`] traits.

#![warn(missing_docs)]

pub mod build;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod fetch;
pub mod models;
