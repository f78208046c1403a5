//! Routing targets.

use std::fmt;

use serde::Serialize;

use crate::error::InvalidTargetError;

/// Opaque, non-empty identifier of the handler a URL is routed to,
/// typically a browser application name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Target(String);

impl Target {
    /// Create a target. Blank names are rejected.
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidTargetError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InvalidTargetError);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Target {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Target {
    type Error = InvalidTargetError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl TryFrom<String> for Target {
    type Error = InvalidTargetError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Self::new(name)
    }
}

impl PartialEq<str> for Target {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Target {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
