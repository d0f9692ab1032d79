use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;

use crate::config::AutomationConfig;
use crate::dispatch::types::{AutomationBackend, AutomationRequest, ByteStream, DispatchError};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Talks to the hosted automation service over HTTP.
pub struct HttpBackend {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpBackend {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::from_config(&AutomationConfig {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            ..AutomationConfig::default()
        })
    }

    pub fn from_config(cfg: &AutomationConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("best-bet/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs));
        // Runs stream for minutes; only cap the whole request when asked to.
        if let Some(secs) = cfg.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("building reqwest client")?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

#[async_trait]
impl AutomationBackend for HttpBackend {
    async fn open(&self, req: &AutomationRequest) -> Result<ByteStream, DispatchError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "text/event-stream")
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DispatchError::Status(status));
        }

        let body = resp
            .bytes_stream()
            .map(|chunk| chunk.map(|b| b.to_vec()).map_err(DispatchError::from));
        Ok(Box::pin(body))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
