//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::DispatchConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<DispatchConfig, ConfigError> {
    let config: DispatchConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DispatchConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    tracing::info!(
        path = %path.display(),
        rules = config.rules.len(),
        default_target = %config.default_target,
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            default_target = "Firefox"

            [matching]
            regex_budget_ms = 25

            [[rules]]
            name = "apple"
            domains = ["apple.com", "example.org"]
            target = "Safari"

            [[rules]]
            hostnames = ["localhost"]
            patterns = ['.*\.dev$']
            target = "Chrome"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_target, "Firefox");
        assert_eq!(config.matching.regex_budget_ms, 25);
        assert_eq!(config.rules.len(), 2);
        assert_eq!(config.rules[1].patterns.as_deref(), Some(&[r".*\.dev$".to_string()][..]));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("default_target = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let err = parse_config("[[rules]]\ntarget = \"Safari\"\n").unwrap_err();
        match &err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err
            .to_string()
            .starts_with("Validation failed: default_target must not be empty, rule #0"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/link-dispatch.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
