//! URL matching logic.
//!
//! # Responsibilities
//! - Match the host against registrable domains (domain or any subdomain)
//! - Match the host against exact hostnames or regular expressions
//! - Match the raw URL against a literal substring
//!
//! # Design Decisions
//! - Closed set of matcher kinds, one enum variant each
//! - Hosts and domains are normalized before comparison, so domain and
//!   hostname matching is case-insensitive
//! - Literal matching is case-sensitive against the original input
//! - Regexes are compiled once and never anchored implicitly
//! - Regex evaluation is charged against a per-URL [`Deadline`]; an overrun
//!   fails closed

use std::time::{Duration, Instant};

use regex::{Regex, RegexBuilder};

use crate::routing::parse::{normalize_host, ParsedUrl};

/// Default compiled-size limit for hostname patterns, in bytes.
pub const DEFAULT_REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Compile a hostname pattern with a bounded compiled size.
pub fn compile_pattern(pattern: &str, size_limit: usize) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).size_limit(size_limit).build()
}

/// Time budget for regex evaluation while routing a single URL.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start the clock.
    pub fn start(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.budget
    }
}

/// A regex evaluation that ran out of budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overrun {
    pub pattern: String,
    pub elapsed: Duration,
}

/// Predicate over a parsed URL.
#[derive(Debug, Clone)]
pub enum Matcher {
    DomainSet(DomainSet),
    HostnameSet(HostnameSet),
    Literal(Literal),
}

impl Matcher {
    /// Evaluate against `url`.
    ///
    /// Only [`HostnameSet`] patterns consume the deadline; the other kinds
    /// always return `Ok`.
    pub fn matches(&self, url: &ParsedUrl, deadline: &Deadline) -> Result<bool, Overrun> {
        match self {
            Matcher::DomainSet(set) => Ok(set.matches(url.host())),
            Matcher::HostnameSet(set) => set.matches(url.host(), deadline),
            Matcher::Literal(literal) => Ok(literal.matches(url.full())),
        }
    }

    /// Short name of the matcher kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Matcher::DomainSet(_) => "domains",
            Matcher::HostnameSet(_) => "hostnames",
            Matcher::Literal(_) => "contains",
        }
    }
}

impl From<DomainSet> for Matcher {
    fn from(set: DomainSet) -> Self {
        Matcher::DomainSet(set)
    }
}

impl From<HostnameSet> for Matcher {
    fn from(set: HostnameSet) -> Self {
        Matcher::HostnameSet(set)
    }
}

impl From<Literal> for Matcher {
    fn from(literal: Literal) -> Self {
        Matcher::Literal(literal)
    }
}

/// Matches a domain and all of its subdomains.
#[derive(Debug, Clone, Default)]
pub struct DomainSet {
    domains: Vec<String>,
}

impl DomainSet {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| normalize_host(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// `host` must already be normalized.
    pub fn matches(&self, host: &str) -> bool {
        self.domains.iter().any(|domain| {
            host == domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }
}

/// Matches exact hostnames or hostname patterns.
#[derive(Debug, Clone, Default)]
pub struct HostnameSet {
    exact: Vec<String>,
    patterns: Vec<Regex>,
}

impl HostnameSet {
    pub fn new<I, S>(exact: I, patterns: Vec<Regex>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            exact: exact
                .into_iter()
                .map(|h| normalize_host(h.as_ref()))
                .collect(),
            patterns,
        }
    }

    /// Compile `patterns` and build the set. On failure returns the offending
    /// pattern with its error.
    pub fn compile<I, S>(
        exact: I,
        patterns: &[String],
        size_limit: usize,
    ) -> Result<Self, (String, regex::Error)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .iter()
            .map(|p| compile_pattern(p, size_limit).map_err(|e| (p.clone(), e)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(exact, compiled))
    }

    /// `host` must already be normalized. Exact entries are checked first and
    /// never consume the deadline.
    pub fn matches(&self, host: &str, deadline: &Deadline) -> Result<bool, Overrun> {
        if self.exact.iter().any(|h| h == host) {
            return Ok(true);
        }

        for pattern in &self.patterns {
            if deadline.is_expired() {
                return Err(overrun(pattern, deadline));
            }
            let hit = pattern.is_match(host);
            if deadline.is_expired() {
                return Err(overrun(pattern, deadline));
            }
            if hit {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

fn overrun(pattern: &Regex, deadline: &Deadline) -> Overrun {
    Overrun {
        pattern: pattern.as_str().to_string(),
        elapsed: deadline.elapsed(),
    }
}

/// Matches when the original URL contains a substring.
#[derive(Debug, Clone)]
pub struct Literal {
    needle: String,
}

impl Literal {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }

    pub fn matches(&self, full: &str) -> bool {
        full.contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> ParsedUrl {
        ParsedUrl::parse(raw).unwrap()
    }

    fn generous() -> Deadline {
        Deadline::start(Duration::from_secs(60))
    }

    #[test]
    fn test_domain_set() {
        let matcher = Matcher::from(DomainSet::new(["apple.com"]));
        let deadline = generous();

        assert_eq!(matcher.matches(&url("https://www.apple.com"), &deadline), Ok(true));
        assert_eq!(matcher.matches(&url("https://apple.com"), &deadline), Ok(true));
        assert_eq!(matcher.matches(&url("https://a.b.APPLE.com./x"), &deadline), Ok(true));
        assert_eq!(matcher.matches(&url("https://notapple.com"), &deadline), Ok(false));
        assert_eq!(matcher.matches(&url("https://apple.com.evil.net"), &deadline), Ok(false));
    }

    #[test]
    fn test_domain_set_normalizes_entries() {
        let set = DomainSet::new(["Reddit.COM.", ""]);
        assert_eq!(set.domains(), ["reddit.com"]);
        assert!(set.matches("old.reddit.com"));
    }

    #[test]
    fn test_empty_domain_set_never_matches() {
        let set = DomainSet::new(Vec::<String>::new());
        assert!(!set.matches("apple.com"));
        assert!(!set.matches(""));
    }

    #[test]
    fn test_hostname_patterns() {
        let set = HostnameSet::compile(
            Vec::<String>::new(),
            &[r".*\.dev$".to_string()],
            DEFAULT_REGEX_SIZE_LIMIT,
        )
        .unwrap();
        let deadline = generous();

        assert_eq!(set.matches("foo.dev", &deadline), Ok(true));
        assert_eq!(set.matches("a.b.dev", &deadline), Ok(true));
        assert_eq!(set.matches("foo.devx", &deadline), Ok(false));
    }

    #[test]
    fn test_hostname_patterns_not_anchored() {
        let set = HostnameSet::compile(
            Vec::<String>::new(),
            &["vm".to_string()],
            DEFAULT_REGEX_SIZE_LIMIT,
        )
        .unwrap();
        let deadline = generous();

        assert_eq!(set.matches("build.vm.local", &deadline), Ok(true));
        assert_eq!(set.matches("vmware.com", &deadline), Ok(true));
        assert_eq!(set.matches("example.org", &deadline), Ok(false));
    }

    #[test]
    fn test_hostname_exact() {
        let set = HostnameSet::new(["LocalHost"], Vec::new());
        let deadline = generous();

        assert_eq!(set.matches("localhost", &deadline), Ok(true));
        assert_eq!(set.matches("localhost.localdomain", &deadline), Ok(false));
    }

    #[test]
    fn test_hostname_invalid_pattern() {
        let err = HostnameSet::compile(
            Vec::<String>::new(),
            &["(unclosed".to_string()],
            DEFAULT_REGEX_SIZE_LIMIT,
        )
        .unwrap_err();
        assert_eq!(err.0, "(unclosed");
    }

    #[test]
    fn test_expired_deadline_fails_closed() {
        let set = HostnameSet::new(["exact.dev"], vec![compile_pattern(".*", 1 << 20).unwrap()]);
        let expired = Deadline::start(Duration::ZERO);

        // Exact entries do not consume the budget.
        assert_eq!(set.matches("exact.dev", &expired), Ok(true));

        let err = set.matches("anything.dev", &expired).unwrap_err();
        assert_eq!(err.pattern, ".*");
    }

    #[test]
    fn test_literal_is_case_sensitive() {
        let matcher = Matcher::from(Literal::new(".vm"));
        let deadline = generous();

        assert_eq!(matcher.matches(&url("http://build.vm:8080/"), &deadline), Ok(true));
        assert_eq!(matcher.matches(&url("http://example.org/?h=a.vm"), &deadline), Ok(true));
        assert_eq!(matcher.matches(&url("http://BUILD.VM/"), &deadline), Ok(false));
    }

    #[test]
    fn test_kind() {
        assert_eq!(Matcher::from(DomainSet::default()).kind(), "domains");
        assert_eq!(Matcher::from(HostnameSet::default()).kind(), "hostnames");
        assert_eq!(Matcher::from(Literal::new("x")).kind(), "contains");
    }
}
