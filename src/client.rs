use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Url;
use std::sync::Arc;
use tracing::debug;

use crate::domain::RequestOutcome;
use crate::error::Result;

/// Issues one GET for a target path and reports what came back.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, path: &str) -> RequestOutcome;
}

/// Opens a fresh session for each active phase. The session is shared by the
/// phase's workers and dropped when the phase ends.
pub trait Connector: Send + Sync {
    fn connect(&self) -> Result<Arc<dyn Fetcher>>;
}

#[derive(Debug, Clone)]
pub struct HttpConnector {
    base_url: String,
}

impl HttpConnector {
    pub fn new(base_url: &Url) -> Self {
        Self {
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }
}

impl Connector for HttpConnector {
    fn connect(&self) -> Result<Arc<dyn Fetcher>> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("edge-stress/0.2"));
        // Targets are typically a local proxy with a self-signed certificate.
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .default_headers(headers)
            .build()?;
        Ok(Arc::new(HttpSession {
            base_url: self.base_url.clone(),
            client,
        }))
    }
}

/// Pooled HTTP client for one phase.
pub struct HttpSession {
    base_url: String,
    client: reqwest::Client,
}

impl HttpSession {
    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, url: String) -> reqwest::Result<u64> {
        let resp = self.client.get(url).send().await?;
        let body = resp.bytes().await?;
        Ok(body.len() as u64)
    }
}

#[async_trait]
impl Fetcher for HttpSession {
    async fn fetch(&self, path: &str) -> RequestOutcome {
        match self.get(self.url_for(path)).await {
            Ok(bytes) => RequestOutcome::Received { bytes },
            Err(e) => {
                debug!(error = %e, path, "request failed");
                RequestOutcome::Failed
            }
        }
    }
}
