// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod metrics;
pub mod recs;
pub mod risk;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::ServiceConfig;
pub use crate::risk::{RiskReport, RiskScorer};

use axum::Router;
use tracing::info;

/// Build the full app from `config/service.toml` + env (see [`ServiceConfig::load_default`]).
pub async fn app() -> anyhow::Result<Router> {
    let cfg = ServiceConfig::load_default()?;
    build_app(&cfg)
}

/// Build the router for an explicit configuration.
pub fn build_app(cfg: &ServiceConfig) -> anyhow::Result<Router> {
    let orchestrator = recs::upstream::orchestrator_from_config(cfg)?;
    let mut router = api::router(AppState::new(orchestrator));

    let metrics = crate::metrics::Metrics::init(cfg.top_k)?;
    if cfg.metrics_route {
        router = router.merge(metrics.router());
    }

    info!(metrics_route = cfg.metrics_route, "router ready");
    Ok(router)
}
