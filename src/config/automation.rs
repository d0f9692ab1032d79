// src/config/automation.rs
use serde::{Deserialize, Serialize};

use crate::odds::Source;

pub const DEFAULT_ENDPOINT: &str = "https://mino.ai/v1/automation/run-sse";
pub const ENV_API_KEY: &str = "AUTOMATION_API_KEY";
pub const ENV_ENDPOINT: &str = "AUTOMATION_ENDPOINT";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// "ENV" means: read from AUTOMATION_API_KEY
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request cap. Unset by default since runs stream for minutes.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: default_api_key(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: None,
        }
    }
}

impl AutomationConfig {
    pub fn wants_env_key(&self) -> bool {
        self.api_key.trim().eq_ignore_ascii_case("env")
    }
}

pub fn default_sources() -> Vec<Source> {
    vec![
        Source::new("DraftKings", "https://sportsbook.draftkings.com"),
        Source::new("FanDuel", "https://sportsbook.fanduel.com"),
        Source::new("BetMGM", "https://sports.betmgm.com"),
    ]
}
