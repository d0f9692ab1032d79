// src/config/mod.rs
pub mod automation;

pub use automation::{AutomationConfig, DEFAULT_ENDPOINT, ENV_API_KEY, ENV_ENDPOINT};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::odds::Source;

pub const DEFAULT_CONFIG_PATH: &str = "config/bestbet.toml";
pub const ENV_CONFIG_PATH: &str = "BESTBET_CONFIG_PATH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub automation: AutomationConfig,
    #[serde(default = "automation::default_sources")]
    pub sources: Vec<Source>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            automation: AutomationConfig::default(),
            sources: automation::default_sources(),
        }
    }
}

impl AppConfig {
    /// Parse from TOML and clean the source list. Does not touch the environment.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s).context("parsing app config toml")?;
        cfg.sources = clean_sources(cfg.sources);
        if cfg.sources.is_empty() {
            bail!("no sources configured");
        }
        if cfg.automation.connect_timeout_secs == 0 {
            warn!(
                default = automation::DEFAULT_CONNECT_TIMEOUT_SECS,
                "connect_timeout_secs = 0 replaced by the default"
            );
            cfg.automation.connect_timeout_secs = automation::DEFAULT_CONNECT_TIMEOUT_SECS;
        }
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading app config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load config using env var + fallbacks, then resolve env overrides:
    /// 1) $BESTBET_CONFIG_PATH
    /// 2) config/bestbet.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let pb = PathBuf::from(DEFAULT_CONFIG_PATH);
            if pb.exists() {
                Self::load_from(&pb)?
            } else {
                Self::default()
            }
        };
        cfg.resolve_env()?;

        // Safe diagnostics: never the key itself.
        info!(
            "app cfg loaded: endpoint={}, sources={}, key_len={}",
            cfg.automation.endpoint,
            cfg.sources.len(),
            cfg.automation.api_key.len()
        );
        Ok(cfg)
    }

    /// Apply AUTOMATION_ENDPOINT and resolve an "ENV" api key.
    pub fn resolve_env(&mut self) -> Result<()> {
        if let Ok(ep) = std::env::var(ENV_ENDPOINT) {
            if !ep.trim().is_empty() {
                self.automation.endpoint = ep.trim().to_string();
            }
        }
        if self.automation.wants_env_key() {
            self.automation.api_key = std::env::var(ENV_API_KEY)
                .ok()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| anyhow!("Missing {ENV_API_KEY} env var"))?;
        }
        Ok(())
    }
}

/// Trim names, drop blanks, keep the first of duplicate names.
fn clean_sources(items: Vec<Source>) -> Vec<Source> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let name = it.name.trim().to_string();
        let endpoint = it.endpoint.trim().to_string();
        if name.is_empty() || endpoint.is_empty() {
            continue;
        }
        if !seen.insert(name.to_ascii_lowercase()) {
            warn!(source = %name, "duplicate source name ignored");
            continue;
        }
        out.push(Source { name, endpoint });
    }
    out
}
