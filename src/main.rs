//! BestBet — Binary Entrypoint
//! Boots the Axum HTTP server: config, tracing, metrics and the run/state routes.

use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use best_bet::config::AppConfig;
use best_bet::metrics::Metrics;

/// Compact tracing logs; RUST_LOG overrides the default filter.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("best_bet=info,warn"));

    // The runtime may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // This enables AUTOMATION_API_KEY / BESTBET_CONFIG_PATH from .env.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load_default()?;
    let metrics = Metrics::init()?;

    let router = best_bet::app(&cfg)?.merge(metrics.router());

    Ok(router.into())
}
