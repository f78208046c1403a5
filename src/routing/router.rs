//! Rule lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled rules in declaration order
//! - Select the target of the first matching rule, else the default
//! - Report regex budget overruns and keep going
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over rules, short-circuiting on the first match
//! - Total: every parsed URL yields a target

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::config::schema::{DispatchConfig, MatcherSpec, RuleConfig};
use crate::error::{BuildError, InvalidUrlError, MatcherTimeoutError};
use crate::observability::{metrics, TimeoutReporter, TracingReporter};
use crate::routing::matcher::{
    Deadline, DomainSet, HostnameSet, Literal, Matcher, DEFAULT_REGEX_SIZE_LIMIT,
};
use crate::routing::parse::ParsedUrl;
use crate::routing::target::Target;

/// Default per-URL budget for regex evaluation.
pub const DEFAULT_REGEX_BUDGET: Duration = Duration::from_millis(10);

/// A matcher paired with the target it routes to.
#[derive(Debug, Clone)]
pub struct Rule {
    name: Option<String>,
    matcher: Matcher,
    target: Target,
}

impl Rule {
    pub fn new(matcher: impl Into<Matcher>, target: Target) -> Self {
        Self {
            name: None,
            matcher: matcher.into(),
            target,
        }
    }

    /// Attach a name for logs and timeout reports.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{index}"))
    }
}

/// Default target plus ordered rules.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub default_target: Target,
    pub rules: Vec<Rule>,
    pub regex_budget: Duration,
}

impl RouterConfig {
    pub fn new(default_target: Target) -> Self {
        Self {
            default_target,
            rules: Vec::new(),
            regex_budget: DEFAULT_REGEX_BUDGET,
        }
    }

    /// Append a rule after all existing ones.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn regex_budget(mut self, budget: Duration) -> Self {
        self.regex_budget = budget;
        self
    }

    /// Compile a deserialized configuration. Patterns are compiled here, once.
    pub fn from_dispatch(config: &DispatchConfig) -> Result<Self, BuildError> {
        let default_target =
            Target::new(config.default_target.as_str()).map_err(|source| BuildError::Target {
                rule: "default target".to_string(),
                source,
            })?;

        let size_limit = match config.matching.regex_size_limit {
            0 => DEFAULT_REGEX_SIZE_LIMIT,
            limit => limit,
        };

        let rules = config
            .rules
            .iter()
            .enumerate()
            .map(|(index, rule)| compile_rule(index, rule, size_limit))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            default_target,
            rules,
            regex_budget: Duration::from_millis(config.matching.regex_budget_ms),
        })
    }
}

fn compile_rule(
    index: usize,
    config: &RuleConfig,
    size_limit: usize,
) -> Result<Rule, BuildError> {
    let label = config.label(index);
    let target = Target::new(config.target.as_str()).map_err(|source| BuildError::Target {
        rule: format!("rule {label}"),
        source,
    })?;

    let spec = config.matcher_spec().map_err(|e| BuildError::Matcher {
        rule: label.clone(),
        reason: e.to_string(),
    })?;

    let matcher = match spec {
        MatcherSpec::Domains(domains) => Matcher::from(DomainSet::new(domains)),
        MatcherSpec::Hostnames { exact, patterns } => {
            HostnameSet::compile(exact, patterns, size_limit)
                .map(Matcher::from)
                .map_err(|(pattern, source)| BuildError::Pattern {
                    rule: label.clone(),
                    pattern,
                    source,
                })?
        }
        MatcherSpec::Contains(needle) if needle.is_empty() => {
            return Err(BuildError::Matcher {
                rule: label,
                reason: "`contains` must not be empty".to_string(),
            });
        }
        MatcherSpec::Contains(needle) => Matcher::from(Literal::new(needle)),
    };

    let rule = Rule::new(matcher, target);
    Ok(match &config.name {
        Some(name) => rule.named(name.clone()),
        None => rule,
    })
}

/// The rule that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchedRule<'a> {
    pub index: usize,
    pub name: Option<&'a str>,
}

/// Outcome of routing one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision<'a> {
    pub target: &'a Target,
    /// `None` when the default target was used.
    pub rule: Option<MatchedRule<'a>>,
}

/// First-match-wins URL router.
#[derive(Debug)]
pub struct Router {
    config: RouterConfig,
    reporter: Arc<dyn TimeoutReporter>,
}

impl Router {
    /// Create a router that reports timeouts through [`TracingReporter`].
    pub fn new(config: RouterConfig) -> Self {
        Self::with_reporter(config, Arc::new(TracingReporter))
    }

    pub fn with_reporter(config: RouterConfig, reporter: Arc<dyn TimeoutReporter>) -> Self {
        Self { config, reporter }
    }

    /// Build from a deserialized configuration.
    pub fn from_config(config: &DispatchConfig) -> Result<Self, BuildError> {
        RouterConfig::from_dispatch(config).map(Self::new)
    }

    /// Select the target for `url`.
    pub fn route(&self, url: &ParsedUrl) -> &Target {
        self.decide(url).target
    }

    /// Parse `raw` and route it.
    pub fn route_str(&self, raw: &str) -> Result<&Target, InvalidUrlError> {
        let url = ParsedUrl::parse(raw)?;
        Ok(self.route(&url))
    }

    /// Route `url` and report which rule decided it.
    pub fn decide(&self, url: &ParsedUrl) -> Decision<'_> {
        let deadline = Deadline::start(self.config.regex_budget);

        for (index, rule) in self.config.rules.iter().enumerate() {
            match rule.matcher.matches(url, &deadline) {
                Ok(true) => {
                    tracing::debug!(
                        host = %url.host(),
                        rule = index,
                        name = rule.name().unwrap_or(""),
                        kind = rule.matcher.kind(),
                        target = %rule.target,
                        "Rule matched"
                    );
                    metrics::record_route(rule.target.as_str(), "rule");
                    return Decision {
                        target: &rule.target,
                        rule: Some(MatchedRule {
                            index,
                            name: rule.name(),
                        }),
                    };
                }
                Ok(false) => {}
                Err(overrun) => {
                    self.reporter.report(&MatcherTimeoutError {
                        rule: rule.label(index),
                        pattern: overrun.pattern,
                        budget: deadline.budget(),
                        elapsed: overrun.elapsed,
                    });
                }
            }
        }

        tracing::debug!(
            host = %url.host(),
            target = %self.config.default_target,
            "No rule matched, using default"
        );
        metrics::record_route(self.config.default_target.as_str(), "default");
        Decision {
            target: &self.config.default_target,
            rule: None,
        }
    }

    pub fn default_target(&self) -> &Target {
        &self.config.default_target
    }

    pub fn rules(&self) -> &[Rule] {
        &self.config.rules
    }

    pub fn regex_budget(&self) -> Duration {
        self.config.regex_budget
    }
}
