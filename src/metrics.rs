use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Only one recorder may exist per process.
    pub fn init() -> anyhow::Result<Self> {
        // Use default buckets to avoid API differences across crate versions.
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
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

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "dispatch_requests_total",
            "Automation requests sent, one per source per run."
        );
        describe_counter!(
            "dispatch_transport_errors_total",
            "Sources that ended in a network error."
        );
        describe_counter!(
            "dispatch_results_total",
            "Settled sources by outcome (success, error, unresolved)."
        );
        describe_counter!("decoder_events_total", "Events decoded from automation streams.");
        describe_counter!(
            "decoder_skipped_lines_total",
            "Stream lines skipped as unprefixed or malformed."
        );
        describe_histogram!("dispatch_run_ms", "Wall time of a whole run in milliseconds.");
    });
}
