//! Request/response handlers served under `/functions/v1/<name>`.
//!
//! Each handler authenticates the bearer token, reads a handful of rows,
//! computes or templates its result, and optionally writes rows back. Store and
//! upstream failures are reported as 500 with the handler's own error code and
//! the caught message.

pub mod mentor_activities;
pub mod mentor_follow;
pub mod profile_analysis;
pub mod progress_analysis;
pub mod recommendations;
pub mod skill_gap;

/// Mean of `values`, 0 for an empty slice.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
