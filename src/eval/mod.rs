//! Sliding-window cross-season evaluation
//!
//! Sweeps every valid (window length, season offset) pair, driving a
//! [`crate::train::Trainer`] once per pair, and records per-season results.

pub mod report;
pub mod sweep;

pub use report::{append_result, read_results, ResultsSummary};
pub use sweep::{evaluate_fixed_window, sweep, SweepResults};
