// tests/common/mod.rs
//
// Scripted automation backend + SSE body builders shared by integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use best_bet::dispatch::types::{AutomationBackend, AutomationRequest, ByteStream, DispatchError};
use futures_util::{stream, StreamExt};
use serde_json::json;

pub enum Script {
    /// Service answers with a non-OK status.
    Status(u16),
    /// Body delivered chunk by chunk, yielding to the scheduler between chunks.
    Chunks(Vec<Vec<u8>>),
    /// Like `Chunks`, then the connection drops.
    BreakAfter(Vec<Vec<u8>>),
}

pub struct ScriptedBackend {
    scripts: HashMap<String, Script>,
    pub seen: Mutex<Vec<AutomationRequest>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, url: &str, script: Script) -> Self {
        self.scripts.insert(url.to_string(), script);
        self
    }

    /// Whole body in one chunk.
    pub fn body(self, url: &str, body: String) -> Self {
        self.with(url, Script::Chunks(vec![body.into_bytes()]))
    }
}

fn yielding(chunks: Vec<Vec<u8>>) -> impl futures_util::Stream<Item = Result<Vec<u8>, DispatchError>> + Send {
    stream::iter(chunks).then(|c| async move {
        tokio::task::yield_now().await;
        Ok::<_, DispatchError>(c)
    })
}

#[async_trait::async_trait]
impl AutomationBackend for ScriptedBackend {
    async fn open(&self, req: &AutomationRequest) -> Result<ByteStream, DispatchError> {
        self.seen.lock().unwrap().push(req.clone());
        match self.scripts.get(&req.url) {
            None => Err(DispatchError::Status(reqwest::StatusCode::NOT_FOUND)),
            Some(Script::Status(code)) => Err(DispatchError::Status(
                reqwest::StatusCode::from_u16(*code).unwrap(),
            )),
            Some(Script::Chunks(chunks)) => Ok(Box::pin(yielding(chunks.clone()))),
            Some(Script::BreakAfter(chunks)) => {
                let broken = stream::iter(vec![Err(DispatchError::Read("connection reset".into()))]);
                Ok(Box::pin(yielding(chunks.clone()).chain(broken)))
            }
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn url_line(url: &str) -> String {
    format!(
        "data: {}\n",
        json!({ "type": "STREAMING_URL", "streamingUrl": url })
    )
}

pub fn odds_json(home: &str, away: &str, h: &str, d: &str, a: &str) -> serde_json::Value {
    json!({
        "date": "2026-10-24",
        "time": "12:30",
        "home_team": home,
        "away_team": away,
        "betting_odds": { "home_wins": h, "draw": d, "away_wins": a }
    })
}

pub fn complete_line(result: serde_json::Value) -> String {
    format!(
        "data: {}\n",
        json!({ "type": "COMPLETE", "status": "COMPLETED", "resultJson": result })
    )
}

pub fn progress_line(purpose: &str) -> String {
    format!("data: {}\n", json!({ "type": "PROGRESS", "purpose": purpose }))
}
