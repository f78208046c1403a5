//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Installed before the config is read, so load and validation events are
//!   not lost; the configured level is applied afterwards through a reload
//!   handle
//! - `RUST_LOG` wins over the configured level
//! - Logs go to stderr; stdout carries routing results

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

use crate::config::schema::ObservabilityConfig;

/// Handle to the installed filter.
pub struct LogHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LogHandle {
    /// Switch to the configured level unless `RUST_LOG` is set.
    pub fn apply(&self, config: &ObservabilityConfig) {
        if self.from_env {
            return;
        }
        if let Err(e) = self
            .filter
            .reload(EnvFilter::new(default_directive(&config.log_level)))
        {
            tracing::warn!(error = %e, log_level = %config.log_level, "Failed to apply log level");
        }
    }
}

/// Install the global subscriber at `info`. Call once, from the binary.
pub fn init_logging() -> LogHandle {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_directive("info")), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    LogHandle {
        filter: handle,
        from_env,
    }
}

fn default_directive(level: &str) -> String {
    format!("link_dispatch={level}")
}
