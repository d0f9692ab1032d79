//! decoder.rs — Incremental decoder for the automation service's event stream.
//!
//! Bytes arrive in arbitrary chunks. Text decoding is stateful (a multi-byte
//! character may straddle two chunks), lines are split on `\n`, and every
//! `data: ` line is parsed as a JSON envelope. Anything that does not parse is
//! skipped: keep-alives and partial lines are normal on this stream.


use metrics::counter;
use serde::Deserialize;
use serde_json::Value;

use crate::odds::{ErrorRecord, OddsRecord, SourceResult, INVALID_RESULT, UNKNOWN_ERROR};

/// Reserved prefix of event lines.
pub const DATA_PREFIX: &str = "data: ";

/// Typed event emitted for one source.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Live preview of the remote browser session.
    StreamingUrl(String),
    /// Terminal payload; nothing after it matters for this source.
    Complete(SourceResult),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Envelope {
    #[serde(rename = "STREAMING_URL")]
    StreamingUrl {
        #[serde(rename = "streamingUrl")]
        streaming_url: String,
    },
    #[serde(rename = "COMPLETE")]
    Complete {
        #[serde(rename = "resultJson", default)]
        result_json: Value,
    },
    // progress, heartbeat and whatever else the service adds later
    #[serde(other)]
    Other,
}

#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Bytes not yet decoded (an incomplete UTF-8 sequence at most).
    pending: Vec<u8>,
    /// Decoded text without a terminating newline yet.
    text: String,
    /// Prefix of `text` already searched for `\n`.
    scanned: usize,
    /// A leading byte-order mark has been looked for.
    bom_checked: bool,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the events completed by it, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.pending.extend_from_slice(chunk);
        self.decode(false);
        self.drain_lines()
    }

    /// End of body: flush undecodable leftovers and a final unterminated line.
    pub fn finish(mut self) -> Vec<StreamEvent> {
        self.decode(true);
        let mut out = self.drain_lines();
        if !self.text.is_empty() {
            let last = std::mem::take(&mut self.text);
            if let Some(ev) = parse_line(strip_cr(&last)) {
                out.push(ev);
            }
        }
        out
    }

    fn decode(&mut self, last: bool) {
        let mut start = 0;
        loop {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(s) => {
                    self.text.push_str(s);
                    start = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.pending[start..start + valid]));
                    start += valid;
                    match e.error_len() {
                        Some(bad) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            start += bad;
                        }
                        None if last => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            start = self.pending.len();
                            break;
                        }
                        // incomplete sequence, wait for the next chunk
                        None => break,
                    }
                }
            }
        }
        self.pending.drain(..start);

        if !self.bom_checked && !self.text.is_empty() {
            if self.text.starts_with('\u{FEFF}') {
                self.text.drain(..'\u{FEFF}'.len_utf8());
            }
            self.bom_checked = true;
        }
    }

    /// Split off every complete line. Only text added since the last call is
    /// searched, so a long line arriving in small chunks stays linear.
    fn drain_lines(&mut self) -> Vec<StreamEvent> {
        let mut out = Vec::new();
        let mut start = 0;
        let mut scan = self.scanned;
        while let Some(rel) = self.text[scan..].find('\n') {
            let end = scan + rel;
            if let Some(ev) = parse_line(strip_cr(&self.text[start..end])) {
                out.push(ev);
            }
            start = end + 1;
            scan = start;
        }
        self.text.drain(..start);
        self.scanned = self.text.len();
        out
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

/// Parse a single line. `None` for anything that is not a recognized event.
pub fn parse_line(line: &str) -> Option<StreamEvent> {
    if line.is_empty() {
        return None;
    }
    let Some(json) = line.strip_prefix(DATA_PREFIX) else {
        skipped(line, "no data prefix");
        return None;
    };
    let envelope: Envelope = match serde_json::from_str(json) {
        Ok(env) => env,
        Err(e) => {
            skipped(line, &e.to_string());
            return None;
        }
    };
    let ev = match envelope {
        Envelope::StreamingUrl { streaming_url } => StreamEvent::StreamingUrl(streaming_url),
        Envelope::Complete { result_json } => StreamEvent::Complete(classify_result(result_json)),
        Envelope::Other => return None,
    };
    counter!("decoder_events_total").increment(1);
    Some(ev)
}

fn skipped(line: &str, why: &str) {
    counter!("decoder_skipped_lines_total").increment(1);
    tracing::trace!(target: "decoder", len = line.len(), why, "skipped stream line");
}

/// Turn a `resultJson` value into the terminal outcome for a source.
pub fn classify_result(value: Value) -> SourceResult {
    // Some runs hand the JSON back as an encoded string.
    let value = match value {
        Value::String(s) => serde_json::from_str(&s).unwrap_or(Value::String(s)),
        other => other,
    };

    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        let error = match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let reason = value
            .get("reason")
            .and_then(Value::as_str)
            .filter(|r| !r.trim().is_empty())
            .unwrap_or(UNKNOWN_ERROR);
        return SourceResult::error(ErrorRecord::new(error, reason));
    }

    if value.get("betting_odds").is_none() {
        return SourceResult::error(ErrorRecord::new(
            INVALID_RESULT,
            "result has no betting_odds",
        ));
    }
    match serde_json::from_value::<OddsRecord>(value) {
        Ok(record) => SourceResult::odds(record),
        Err(e) => SourceResult::error(ErrorRecord::new(INVALID_RESULT, e.to_string())),
    }
}

/// Decode a whole body at once.
pub fn decode_all(body: &[u8]) -> Vec<StreamEvent> {
    let mut dec = StreamDecoder::new();
    let mut out = dec.push(body);
    out.extend(dec.finish());
    out
}
