//! store.rs — Per-source state for the current run.
//!
//! Two mappings keyed by source name: sources currently showing a live
//! preview, and sources that reached their terminal result. A source is in at
//! most one of them, and once it has a result that entry is final for the run.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::decoder::StreamEvent;
use crate::odds::{ErrorRecord, SourceResult};

#[derive(Debug, Default)]
struct Inner {
    generation: u64,
    started_at: Option<DateTime<Utc>>,
    loading: bool,
    streaming: BTreeMap<String, String>,
    results: BTreeMap<String, SourceResult>,
}

/// Read-only copy handed to the display layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSnapshot {
    pub generation: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub loading: bool,
    pub streaming: BTreeMap<String, String>,
    pub results: BTreeMap<String, SourceResult>,
}

#[derive(Debug, Default)]
pub struct AggregateStore {
    inner: RwLock<Inner>,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a new run: drop every entry of the previous one.
    /// Returns the new run's generation.
    pub fn begin_run(&self) -> u64 {
        let mut g = self.write();
        g.generation += 1;
        g.started_at = Some(Utc::now());
        g.loading = true;
        g.streaming.clear();
        g.results.clear();
        g.generation
    }

    /// Clear the loading flag once every source of `generation` has settled.
    /// A superseded run finishing late leaves the active run's flag alone.
    pub fn finish_run(&self, generation: u64) {
        let mut g = self.write();
        if g.generation == generation {
            g.loading = false;
        } else {
            debug!(
                target: "store",
                finished = generation,
                active = g.generation,
                "superseded run finished"
            );
        }
    }

    /// Upsert the preview URL. Ignored once the source has a result.
    pub fn set_streaming(&self, source: &str, url: &str) -> bool {
        let mut g = self.write();
        if g.results.contains_key(source) {
            return false;
        }
        g.streaming.insert(source.to_string(), url.to_string());
        true
    }

    /// Remove the preview URL; no-op when absent.
    pub fn clear_streaming(&self, source: &str) {
        self.write().streaming.remove(source);
    }

    /// Record the terminal result and drop the preview under the same lock.
    /// The first result for a source wins; later ones return `false`.
    pub fn set_result(&self, source: &str, result: SourceResult) -> bool {
        let mut g = self.write();
        if g.results.contains_key(source) {
            return false;
        }
        g.streaming.remove(source);
        g.results.insert(source.to_string(), result);
        true
    }

    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    pub fn is_loading(&self) -> bool {
        self.read().loading
    }

    pub fn streaming(&self) -> BTreeMap<String, String> {
        self.read().streaming.clone()
    }

    pub fn results(&self) -> BTreeMap<String, SourceResult> {
        self.read().results.clone()
    }

    pub fn result_for(&self, source: &str) -> Option<SourceResult> {
        self.read().results.get(source).cloned()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let g = self.read();
        StoreSnapshot {
            generation: g.generation,
            started_at: g.started_at,
            loading: g.loading,
            streaming: g.streaming.clone(),
            results: g.results.clone(),
        }
    }

    /// Write handle for one source of the run `generation`.
    pub fn slot<'a>(&'a self, source: &'a str, generation: u64) -> SourceSlot<'a> {
        SourceSlot {
            store: self,
            source,
            generation,
        }
    }
}

/// The only way a dispatch task touches the store: every write goes to its
/// own source key.
#[derive(Debug, Clone, Copy)]
pub struct SourceSlot<'a> {
    store: &'a AggregateStore,
    source: &'a str,
    generation: u64,
}

impl SourceSlot<'_> {
    pub fn source(&self) -> &str {
        self.source
    }

    /// Apply one decoded event. Returns `true` when the store changed.
    pub fn apply(&self, ev: StreamEvent) -> bool {
        self.check_generation();
        match ev {
            StreamEvent::StreamingUrl(url) => self.store.set_streaming(self.source, &url),
            StreamEvent::Complete(result) => {
                let applied = self.store.set_result(self.source, result);
                if !applied {
                    debug!(target: "store", source = self.source, "event after terminal result dropped");
                }
                applied
            }
        }
    }

    pub fn fail(&self, err: ErrorRecord) -> bool {
        self.check_generation();
        self.store.set_result(self.source, SourceResult::error(err))
    }

    // A newer run cleared the store while this one was still streaming; its
    // events still land in the new run's maps.
    // TODO: decide between cancelling superseded runs and dropping their writes.
    fn check_generation(&self) {
        let active = self.store.generation();
        if active != self.generation {
            warn!(
                target: "store",
                source = self.source,
                run = self.generation,
                active,
                "write from superseded run"
            );
        }
    }
}
