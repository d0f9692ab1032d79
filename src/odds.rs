//! odds.rs — Sources, sports and the per-source result shapes shown on the cards.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error classification recorded when the automation request itself fails.
pub const NETWORK_ERROR: &str = "Network Error";
/// Reason recorded alongside [`NETWORK_ERROR`].
pub const FAILED_TO_CONNECT: &str = "Failed to connect";
/// Reason used when the remote engine reports an error without one.
pub const UNKNOWN_ERROR: &str = "Unknown error";
/// Classification for a `COMPLETE` payload that is neither an error nor odds.
pub const INVALID_RESULT: &str = "Invalid Result";

/// A sportsbook probed for odds. Fixed at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub endpoint: String,
}

impl Source {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Sports offered in the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sport {
    Football,
    Soccer,
    Basketball,
}

impl Sport {
    pub const ALL: [Sport; 3] = [Sport::Football, Sport::Soccer, Sport::Basketball];

    pub fn id(self) -> &'static str {
        match self {
            Sport::Football => "football",
            Sport::Soccer => "soccer",
            Sport::Basketball => "basketball",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sport::Football => "Football",
            Sport::Soccer => "Soccer",
            Sport::Basketball => "Basketball",
        }
    }

    /// Example match shown in the empty match input.
    pub fn placeholder(self) -> &'static str {
        match self {
            Sport::Football => "Patriots vs. Chiefs",
            Sport::Soccer => "Man United vs. Chelsea",
            Sport::Basketball => "Golden State vs. Grizzlies",
        }
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Sport {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Sport::ALL
            .into_iter()
            .find(|sp| sp.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("unknown sport: {s}"))
    }
}

/// A price as the sportsbook lists it: American (`"+150"`) or decimal (`2.5`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(f64),
    Text(String),
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Number(n) => write!(f, "{n}"),
            Price::Text(s) => f.write_str(s),
        }
    }
}

/// Three-way market. `draw` is absent for sports without one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BettingOdds {
    #[serde(default)]
    pub home_wins: Option<Price>,
    #[serde(default)]
    pub draw: Option<Price>,
    #[serde(default)]
    pub away_wins: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    pub betting_odds: BettingOdds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub error: String,
    pub reason: String,
}

impl ErrorRecord {
    pub fn new(error: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            reason: reason.into(),
        }
    }

    /// The transport-level failure shared by every connect/status/read error.
    pub fn network() -> Self {
        Self::new(NETWORK_ERROR, FAILED_TO_CONNECT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Odds(OddsRecord),
    Error(ErrorRecord),
}

/// Terminal outcome for one source within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResult {
    pub success: bool,
    pub payload: Payload,
}

impl SourceResult {
    pub fn odds(record: OddsRecord) -> Self {
        Self {
            success: true,
            payload: Payload::Odds(record),
        }
    }

    pub fn error(record: ErrorRecord) -> Self {
        Self {
            success: false,
            payload: Payload::Error(record),
        }
    }

    pub fn as_error(&self) -> Option<&ErrorRecord> {
        match &self.payload {
            Payload::Error(e) => Some(e),
            Payload::Odds(_) => None,
        }
    }

    pub fn as_odds(&self) -> Option<&OddsRecord> {
        match &self.payload {
            Payload::Odds(o) => Some(o),
            Payload::Error(_) => None,
        }
    }
}
