//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every rule declares exactly one matcher and a target
//! - Every hostname pattern compiles under the configured size limit
//! - Validate value ranges (budget and size limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatchConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Empty `domains` lists are accepted; they simply never match

use thiserror::Error;

use crate::config::schema::{DispatchConfig, MatcherSpec};
use crate::routing::matcher::compile_pattern;

/// A semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("default_target must not be empty")]
    EmptyDefaultTarget,

    #[error("rule {rule}: target must not be empty")]
    EmptyTarget { rule: String },

    #[error("rule {rule}: {reason}")]
    Matcher { rule: String, reason: String },

    #[error("rule {rule}: `contains` must not be empty")]
    EmptyLiteral { rule: String },

    #[error("rule {rule}: invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        reason: String,
    },

    #[error("matching.regex_budget_ms must be greater than zero")]
    ZeroRegexBudget,

    #[error("matching.regex_size_limit must be greater than zero")]
    ZeroRegexSizeLimit,
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &DispatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.default_target.trim().is_empty() {
        errors.push(ValidationError::EmptyDefaultTarget);
    }
    if config.matching.regex_budget_ms == 0 {
        errors.push(ValidationError::ZeroRegexBudget);
    }
    if config.matching.regex_size_limit == 0 {
        errors.push(ValidationError::ZeroRegexSizeLimit);
    }

    for (index, rule) in config.rules.iter().enumerate() {
        let label = rule.label(index);

        if rule.target.trim().is_empty() {
            errors.push(ValidationError::EmptyTarget { rule: label.clone() });
        }

        match rule.matcher_spec() {
            Err(e) => errors.push(ValidationError::Matcher {
                rule: label,
                reason: e.to_string(),
            }),
            Ok(MatcherSpec::Contains("")) => {
                errors.push(ValidationError::EmptyLiteral { rule: label })
            }
            Ok(MatcherSpec::Hostnames { patterns, .. }) if config.matching.regex_size_limit > 0 => {
                for pattern in patterns {
                    if let Err(e) = compile_pattern(pattern, config.matching.regex_size_limit) {
                        errors.push(ValidationError::InvalidPattern {
                            rule: label.clone(),
                            pattern: pattern.clone(),
                            reason: e.to_string(),
                        });
                    }
                }
            }
            Ok(MatcherSpec::Domains(domains)) if domains.is_empty() => {
                tracing::warn!(rule = %label, "Rule has an empty domain list and will never match");
            }
            Ok(_) => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
