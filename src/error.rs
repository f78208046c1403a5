//! Error types shared by the routing core and its outer layers.

use std::time::Duration;

use thiserror::Error;

/// The input is not a well-formed absolute URL with a host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid URL {input:?}: {reason}")]
pub struct InvalidUrlError {
    /// The raw string that failed to parse.
    pub input: String,
    /// Why it was rejected.
    pub reason: String,
}

impl InvalidUrlError {
    pub(crate) fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// A regex matcher ran past the per-URL evaluation budget.
///
/// Never returned from routing. The router treats the matcher as a non-match
/// and hands this to its [`TimeoutReporter`](crate::observability::TimeoutReporter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("rule {rule}: pattern {pattern:?} over regex budget {budget:?} (elapsed {elapsed:?})")]
pub struct MatcherTimeoutError {
    /// Rule name, or `#<index>` for unnamed rules.
    pub rule: String,
    /// The pattern being evaluated when the budget ran out.
    pub pattern: String,
    pub budget: Duration,
    pub elapsed: Duration,
}

/// A target identifier was empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("target must not be empty")]
pub struct InvalidTargetError;

/// Errors raised while compiling rule definitions into a router.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The default target or a rule target is empty.
    #[error("{rule}: {source}")]
    Target {
        rule: String,
        #[source]
        source: InvalidTargetError,
    },

    /// A hostname pattern failed to compile.
    #[error("rule {rule}: invalid pattern {pattern:?}: {source}")]
    Pattern {
        rule: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The rule does not describe exactly one usable matcher.
    #[error("rule {rule}: {reason}")]
    Matcher { rule: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = InvalidUrlError::new("not a url", "relative URL without a base");
        assert_eq!(
            err.to_string(),
            "invalid URL \"not a url\": relative URL without a base"
        );

        let err = MatcherTimeoutError {
            rule: "dev".into(),
            pattern: r".*\.dev$".into(),
            budget: Duration::from_millis(10),
            elapsed: Duration::from_millis(12),
        };
        assert!(err.to_string().starts_with("rule dev: pattern"));
        assert!(err.to_string().contains("10ms"));

        assert_eq!(InvalidTargetError.to_string(), "target must not be empty");
    }
}
