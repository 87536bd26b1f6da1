use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

use super::event_source::SourceError;

/// Polled source of the relay's side-channel status document.
#[async_trait]
pub trait StatusDocumentSource: Send + Sync {
    async fn fetch(&self) -> Result<Value, SourceError>;
}

/// Status document kept on disk by the relay (or a sidecar that mirrors it).
#[derive(Debug, Clone)]
pub struct FileStatusDocument {
    path: PathBuf,
}

impl FileStatusDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StatusDocumentSource for FileStatusDocument {
    async fn fetch(&self) -> Result<Value, SourceError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// ankerctl's status endpoint for a base URL; `ws://` hosts map to `http://`.
pub fn status_api_url(host: &str) -> String {
    let base = host.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("ws://") {
        format!("http://{rest}")
    } else if let Some(rest) = base.strip_prefix("wss://") {
        format!("https://{rest}")
    } else {
        base.to_string()
    };
    format!("{base}/api/ankerctl/status")
}

/// Status document served by ankerctl over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStatusDocument {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusDocument {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Poll the status endpoint of an ankerctl base URL.
    pub fn for_host(host: &str) -> Self {
        Self::new(status_api_url(host))
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StatusDocumentSource for HttpStatusDocument {
    async fn fetch(&self) -> Result<Value, SourceError> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        Ok(response.json::<Value>().await?)
    }
}
