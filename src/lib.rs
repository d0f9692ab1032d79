// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod metrics;
pub mod odds;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::decoder::{StreamDecoder, StreamEvent};
pub use crate::dispatch::{Dispatcher, RunSummary};
pub use crate::store::{AggregateStore, StoreSnapshot};

use std::sync::Arc;

use axum::Router;

use crate::config::AppConfig;
use crate::dispatch::http::HttpBackend;

/// Build the service router from a resolved config (HTTP backend, empty store).
pub fn app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let backend = HttpBackend::from_config(&cfg.automation)?;
    let dispatcher = Dispatcher::new(Arc::new(backend), cfg.sources.clone());
    Ok(router(AppState::new(dispatcher)))
}
