//! Reporting of recovered matcher timeouts.

use std::fmt;

use crate::error::MatcherTimeoutError;
use crate::observability::metrics;

/// Receives matcher timeouts that routing recovered from.
///
/// Called synchronously on the routing path; implementations must not block.
pub trait TimeoutReporter: Send + Sync + fmt::Debug {
    fn report(&self, error: &MatcherTimeoutError);
}

/// Logs a warning and bumps `link_dispatch_matcher_timeouts_total`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl TimeoutReporter for TracingReporter {
    fn report(&self, error: &MatcherTimeoutError) {
        tracing::warn!(
            rule = %error.rule,
            pattern = %error.pattern,
            budget_us = error.budget.as_micros() as u64,
            elapsed_us = error.elapsed.as_micros() as u64,
            "Regex matcher exceeded budget, treating as no match"
        );
        metrics::record_matcher_timeout(&error.rule);
    }
}
