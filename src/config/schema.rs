//! Configuration schema definitions.
//!
//! This module defines the on-disk configuration structure for the
//! dispatcher. All types derive Serde traits for deserialization from TOML.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::routing::matcher::DEFAULT_REGEX_SIZE_LIMIT;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatchConfig {
    /// Target used when no rule matches.
    #[serde(alias = "default_browser")]
    pub default_target: String,

    /// Ordered rules; the first match wins.
    pub rules: Vec<RuleConfig>,

    /// Regex evaluation limits.
    pub matching: MatchingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// One routing rule.
///
/// Exactly one matcher kind must be set: `domains`, `hostnames`/`patterns`
/// (together they form one hostname set), or `contains`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RuleConfig {
    /// Rule identifier for logging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Handler to route to.
    #[serde(alias = "browser")]
    pub target: String,

    /// Registrable domains, matched with all subdomains.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<Vec<String>>,

    /// Exact hostnames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostnames: Option<Vec<String>>,

    /// Hostname regular expressions (no implicit anchors).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,

    /// Substring of the full URL (case-sensitive).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
}

/// Borrowed view of the matcher a rule declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherSpec<'a> {
    Domains(&'a [String]),
    Hostnames {
        exact: &'a [String],
        patterns: &'a [String],
    },
    Contains(&'a str),
}

/// Why a rule does not declare exactly one matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatcherSpecError {
    Missing,
    Conflicting(Vec<&'static str>),
}

impl fmt::Display for MatcherSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatcherSpecError::Missing => {
                write!(f, "no matcher given (expected domains, hostnames/patterns or contains)")
            }
            MatcherSpecError::Conflicting(kinds) => {
                write!(f, "conflicting matchers: {}", kinds.join(", "))
            }
        }
    }
}

impl RuleConfig {
    /// Rule name, or `#<index>` when unnamed.
    pub fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{index}"))
    }

    pub fn matcher_spec(&self) -> Result<MatcherSpec<'_>, MatcherSpecError> {
        let mut kinds = Vec::new();
        if self.domains.is_some() {
            kinds.push("domains");
        }
        if self.hostnames.is_some() || self.patterns.is_some() {
            kinds.push("hostnames/patterns");
        }
        if self.contains.is_some() {
            kinds.push("contains");
        }

        match kinds.len() {
            0 => return Err(MatcherSpecError::Missing),
            1 => {}
            _ => return Err(MatcherSpecError::Conflicting(kinds)),
        }

        if let Some(domains) = &self.domains {
            return Ok(MatcherSpec::Domains(domains));
        }
        if let Some(needle) = &self.contains {
            return Ok(MatcherSpec::Contains(needle));
        }
        Ok(MatcherSpec::Hostnames {
            exact: self.hostnames.as_deref().unwrap_or_default(),
            patterns: self.patterns.as_deref().unwrap_or_default(),
        })
    }
}

/// Regex evaluation limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Budget for all regex evaluation while routing one URL, in milliseconds.
    pub regex_budget_ms: u64,

    /// Compiled-size limit per pattern, in bytes.
    pub regex_size_limit: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            regex_budget_ms: 10,
            regex_size_limit: DEFAULT_REGEX_SIZE_LIMIT,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint (`watch` only).
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9091".to_string(),
        }
    }
}
