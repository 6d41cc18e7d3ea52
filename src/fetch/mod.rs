//! Data fetching for the aggregation engine.
//!
//! [`PayrollDataSource`] is the capability the engine calls through, and
//! [`safe_fetch`] is the single place where a failed fetch is turned into a
//! [`FetchResult`] value.

mod safe_fetch;
mod source;

pub use safe_fetch::{FetchResult, safe_fetch};
pub use source::PayrollDataSource;
