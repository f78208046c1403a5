//! Route clicked URLs to browsers by ordered match rules.

pub mod config;
pub mod error;
pub mod observability;
pub mod routing;

pub use config::schema::DispatchConfig;
pub use error::{BuildError, InvalidTargetError, InvalidUrlError, MatcherTimeoutError};
pub use routing::{ParsedUrl, Router, RouterConfig, Rule, SharedRouter, Target};
