//! Metrics collection and exposition.
//!
//! # Metrics
//! - `link_dispatch_routes_total` (counter): routing decisions by target and
//!   outcome (`rule` or `default`)
//! - `link_dispatch_matcher_timeouts_total` (counter): regex budget overruns
//!   by rule
//! - `link_dispatch_config_reloads_total` (counter): reloads by result

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), metrics_exporter_prometheus::BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_route(target: &str, outcome: &'static str) {
    counter!(
        "link_dispatch_routes_total",
        "target" => target.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_matcher_timeout(rule: &str) {
    counter!("link_dispatch_matcher_timeouts_total", "rule" => rule.to_string()).increment(1);
}

pub fn record_config_reload(ok: bool) {
    let result = if ok { "ok" } else { "error" };
    counter!("link_dispatch_config_reloads_total", "result" => result).increment(1);
}
