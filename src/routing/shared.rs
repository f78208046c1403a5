//! Hot-swappable router snapshot.
//!
//! Readers load an `Arc<Router>` and route against it; a reload replaces the
//! whole router at once, so an in-flight lookup only ever sees one complete
//! rule list.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::mpsc;

use crate::config::schema::DispatchConfig;
use crate::error::InvalidUrlError;
use crate::observability::metrics;
use crate::routing::router::Router;
use crate::routing::target::Target;

#[derive(Debug)]
pub struct SharedRouter {
    current: ArcSwap<Router>,
}

impl SharedRouter {
    pub fn new(router: Router) -> Self {
        Self {
            current: ArcSwap::from_pointee(router),
        }
    }

    /// Snapshot of the current router.
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Replace the router. Lookups already in progress finish on the old one.
    pub fn store(&self, router: Router) {
        self.current.store(Arc::new(router));
    }

    /// Parse and route against the current snapshot.
    pub fn route_str(&self, raw: &str) -> Result<Target, InvalidUrlError> {
        self.current.load().route_str(raw).cloned()
    }

    /// Apply configurations from `updates` until the channel closes.
    ///
    /// A configuration that fails to compile is logged and skipped; the
    /// current router stays in place.
    pub async fn follow(self: Arc<Self>, mut updates: mpsc::UnboundedReceiver<DispatchConfig>) {
        while let Some(config) = updates.recv().await {
            match Router::from_config(&config) {
                Ok(router) => {
                    tracing::info!(
                        rules = router.rules().len(),
                        default_target = %router.default_target(),
                        "Router reloaded"
                    );
                    self.store(router);
                    metrics::record_config_reload(true);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Rejected reloaded config, keeping current router");
                    metrics::record_config_reload(false);
                }
            }
        }
        tracing::debug!("Config update channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::matcher::DomainSet;
    use crate::routing::router::{Rule, RouterConfig};

    fn router(default: &str) -> Router {
        Router::new(RouterConfig::new(Target::new(default).unwrap()))
    }

    #[test]
    fn test_store_replaces_router() {
        let shared = SharedRouter::new(router("Firefox"));
        let before = shared.load();

        shared.store(Router::new(
            RouterConfig::new(Target::new("Firefox").unwrap()).rule(Rule::new(
                DomainSet::new(["apple.com"]),
                Target::new("Safari").unwrap(),
            )),
        ));

        // Old snapshot is unaffected.
        assert_eq!(before.route_str("https://apple.com").unwrap(), "Firefox");
        assert_eq!(shared.route_str("https://apple.com").unwrap(), "Safari");
    }
}
