//! URL parsing and host normalization.
//!
//! # Responsibilities
//! - Reject anything that is not an absolute URL with a host
//! - Normalize the host (lowercase, one trailing dot removed)
//! - Keep path and query exactly as written
//!
//! # Design Decisions
//! - The host is always the `url` crate's host, so backslashes, stripped
//!   tabs/newlines and `@` resolve the way a browser resolves them
//! - Punycode labels are turned back into Unicode with `idna`
//! - Path and query are sliced from the raw input only when the raw authority
//!   names the same host; otherwise the `url` crate's path and query are used

use std::fmt;
use std::str::FromStr;

use url::{Host, Url};

use crate::error::InvalidUrlError;

/// A parsed, immutable URL as seen by matchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    scheme: String,
    host: String,
    path: String,
    query: Option<String>,
    full: String,
}

impl ParsedUrl {
    /// Parse an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, InvalidUrlError> {
        let input = raw.trim();
        let parsed = Url::parse(input).map_err(|e| InvalidUrlError::new(raw, e.to_string()))?;
        let host = match parsed.host() {
            Some(Host::Domain(domain)) => {
                let (unicode, _) = idna::domain_to_unicode(domain);
                normalize_host(&unicode)
            }
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => format!("[{addr}]"),
            None => return Err(InvalidUrlError::new(raw, "missing host")),
        };
        if host.is_empty() {
            return Err(InvalidUrlError::new(raw, "missing host"));
        }

        let (path, query) = match split_raw(input, parsed.scheme()) {
            Some(parts) if normalize_host(parts.host) == host => {
                (parts.path.to_string(), parts.query.map(str::to_string))
            }
            _ => (
                parsed.path().to_string(),
                parsed.query().map(str::to_string),
            ),
        };

        Ok(Self {
            scheme: parsed.scheme().to_string(),
            host,
            path,
            query,
            full: raw.to_string(),
        })
    }

    /// Lowercase scheme, e.g. `https`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Normalized host without userinfo or port.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The original input, untouched.
    pub fn full(&self) -> &str {
        &self.full
    }
}

impl FromStr for ParsedUrl {
    type Err = InvalidUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParsedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full)
    }
}

/// Lowercase a host or domain and drop a single trailing dot.
pub(crate) fn normalize_host(host: &str) -> String {
    let lower = host.to_lowercase();
    match lower.strip_suffix('.') {
        Some(stripped) => stripped.to_string(),
        None => lower,
    }
}

struct RawParts<'a> {
    host: &'a str,
    path: &'a str,
    query: Option<&'a str>,
}

fn split_raw<'a>(input: &'a str, scheme: &str) -> Option<RawParts<'a>> {
    let (raw_scheme, rest) = input.split_once("://")?;
    if !raw_scheme.eq_ignore_ascii_case(scheme) {
        return None;
    }

    let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
    let authority_end = rest.find(|c: char| c == '/' || c == '?').unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let (path, query) = match tail.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (tail, None),
    };

    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    Some(RawParts {
        host: strip_port(host_port),
        path,
        query,
    })
}

fn strip_port(authority: &str) -> &str {
    // IPv6 literal: keep the brackets, drop anything after them.
    if authority.starts_with('[') {
        return authority
            .find(']')
            .map_or(authority, |end| &authority[..=end]);
    }
    match authority.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => authority,
    }
}
