// src/dispatch/mod.rs
pub mod goal;
pub mod http;
pub mod types;

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use futures_util::StreamExt;
use metrics::{counter, histogram};
use tracing::{debug, info, warn};

use crate::decoder::{StreamDecoder, StreamEvent};
use crate::dispatch::goal::build_goal;
use crate::dispatch::types::{AutomationBackend, AutomationRequest, DispatchError};
use crate::metrics::ensure_metrics_described;
use crate::odds::{ErrorRecord, Source, Sport};
use crate::store::{AggregateStore, SourceSlot};

/// How one source ended when its task settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    Succeeded,
    Failed,
    /// Stream closed without a terminal event.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub generation: u64,
    pub succeeded: usize,
    pub failed: usize,
    pub unresolved: Vec<String>,
    pub elapsed: Duration,
}

/// Fans one match out to every configured sportsbook.
pub struct Dispatcher {
    backend: Arc<dyn AutomationBackend>,
    sources: Vec<Source>,
}

impl Dispatcher {
    pub fn new(backend: Arc<dyn AutomationBackend>, sources: Vec<Source>) -> Self {
        Self { backend, sources }
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Start a new run (clearing the store) and wait until every source settled.
    pub async fn run(&self, store: &AggregateStore, sport: Sport, match_name: &str) -> RunSummary {
        let generation = store.begin_run();
        self.dispatch(store, generation, sport, match_name).await
    }

    /// Drive a run whose generation was already opened with `begin_run`.
    pub async fn dispatch(
        &self,
        store: &AggregateStore,
        generation: u64,
        sport: Sport,
        match_name: &str,
    ) -> RunSummary {
        ensure_metrics_described();
        let t0 = Instant::now();
        info!(
            target: "dispatch",
            generation,
            %sport,
            sources = self.sources.len(),
            backend = self.backend.name(),
            "run started"
        );

        let tasks = self.sources.iter().map(|src| {
            let slot = store.slot(&src.name, generation);
            self.run_source(slot, src, sport, match_name)
        });
        let outcomes = join_all(tasks).await;
        store.finish_run(generation);

        let mut summary = RunSummary {
            generation,
            succeeded: 0,
            failed: 0,
            unresolved: Vec::new(),
            elapsed: t0.elapsed(),
        };
        for (src, outcome) in self.sources.iter().zip(outcomes) {
            match outcome {
                SourceOutcome::Succeeded => summary.succeeded += 1,
                SourceOutcome::Failed => summary.failed += 1,
                SourceOutcome::Unresolved => summary.unresolved.push(src.name.clone()),
            }
        }

        histogram!("dispatch_run_ms").record(summary.elapsed.as_secs_f64() * 1_000.0);
        info!(
            target: "dispatch",
            generation,
            succeeded = summary.succeeded,
            failed = summary.failed,
            unresolved = ?summary.unresolved,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "run finished"
        );
        summary
    }

    async fn run_source(
        &self,
        slot: SourceSlot<'_>,
        src: &Source,
        sport: Sport,
        match_name: &str,
    ) -> SourceOutcome {
        let req = AutomationRequest {
            url: src.endpoint.clone(),
            goal: build_goal(sport, match_name, src),
        };
        counter!("dispatch_requests_total").increment(1);

        let mut outcome = SourceOutcome::Unresolved;
        if let Err(e) = self.stream_source(&slot, &req, &mut outcome).await {
            warn!(target: "dispatch", source = %src.name, error = %e, "transport error");
            counter!("dispatch_transport_errors_total").increment(1);
            if outcome == SourceOutcome::Unresolved {
                slot.fail(ErrorRecord::network());
                outcome = SourceOutcome::Failed;
            }
        }

        let label = match outcome {
            SourceOutcome::Succeeded => "success",
            SourceOutcome::Failed => "error",
            SourceOutcome::Unresolved => {
                warn!(target: "dispatch", source = %src.name, "stream ended without a result");
                "unresolved"
            }
        };
        counter!("dispatch_results_total", "outcome" => label).increment(1);
        outcome
    }

    /// Read the body sequentially, applying events in arrival order.
    async fn stream_source(
        &self,
        slot: &SourceSlot<'_>,
        req: &AutomationRequest,
        outcome: &mut SourceOutcome,
    ) -> Result<(), DispatchError> {
        let mut body = self.backend.open(req).await?;
        let mut decoder = StreamDecoder::new();
        while let Some(chunk) = body.next().await {
            for ev in decoder.push(&chunk?) {
                apply_event(slot, ev, outcome);
            }
        }
        for ev in decoder.finish() {
            apply_event(slot, ev, outcome);
        }
        Ok(())
    }
}

fn apply_event(slot: &SourceSlot<'_>, ev: StreamEvent, outcome: &mut SourceOutcome) {
    if *outcome != SourceOutcome::Unresolved {
        debug!(target: "dispatch", source = slot.source(), "event after terminal result ignored");
        return;
    }
    match &ev {
        StreamEvent::StreamingUrl(url) => {
            debug!(target: "dispatch", source = slot.source(), %url, "live preview");
        }
        StreamEvent::Complete(result) => {
            *outcome = if result.success {
                SourceOutcome::Succeeded
            } else {
                SourceOutcome::Failed
            };
            info!(
                target: "dispatch",
                source = slot.source(),
                success = result.success,
                "source complete"
            );
        }
    }
    slot.apply(ev);
}
