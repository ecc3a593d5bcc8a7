use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

// One recorder per process; later `init` calls reuse it.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once) and publish the configured top-K.
    pub fn init(top_k: usize) -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                PrometheusBuilder::new()
                    .install_recorder()
                    .map_err(|e| anyhow::anyhow!("prometheus: install recorder: {e}"))
            })?
            .clone();

        ensure_metrics_described();
        gauge!("recs_top_k").set(top_k as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

/// One-time metrics registration (so series carry HELP text on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("risk_predictions_total", "Texts scored by /predict.");
        describe_counter!(
            "risk_spam_flagged_total",
            "Texts whose spam score exceeded 0.5."
        );
        describe_counter!(
            "risk_toxicity_flagged_total",
            "Texts labelled unsafe or toxic."
        );
        describe_histogram!("risk_predict_duration_ms", "Scoring time in milliseconds.");
        describe_counter!("recs_fetch_total", "Recommendation fetches.");
        describe_counter!(
            "recs_cache_hits_total",
            "Fetches answered from an upstream result (cache hit or cold start)."
        );
        describe_counter!(
            "recs_cache_misses_total",
            "Fetches that triggered background regeneration."
        );
        describe_counter!(
            "recs_upstream_errors_total",
            "Recommender calls that failed."
        );
        describe_counter!(
            "recs_regenerations_total",
            "Background regeneration requests dispatched."
        );
        describe_counter!(
            "recs_regeneration_failures_total",
            "Background regeneration requests that failed."
        );
        describe_gauge!("recs_top_k", "Configured size of the ranked list.");
    });
}
