//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing / config produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!     → report.rs (matcher timeouts, as log + counter)
//!
//! Consumers:
//!     → stderr via tracing-subscriber
//!     → Prometheus scrape (optional, `watch` only)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (rule, target, pattern)
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
pub mod report;

pub use report::{TimeoutReporter, TracingReporter};
