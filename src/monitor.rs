// src/monitor.rs - Supervises message ingestion for one printer
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{Instant, MissedTickBehavior};

use crate::communication::{
    EventSource, FileReplaySource, FileStatusDocument, HttpStatusDocument, SourceError, StatusDocumentSource,
    TcpJsonSource, WebSocketSource,
};
use crate::config::{Config, ConfigError, MonitorConfig, SourceConfig, SourceKind};
use crate::printer::SharedEngine;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
    #[error("Source is missing its {0}")]
    IncompleteSource(&'static str),
}

/// Build the message source described by the `[source]` section.
pub fn source_from_config(config: &SourceConfig) -> Result<Arc<dyn EventSource>, MonitorError> {
    let source: Arc<dyn EventSource> = match config.kind {
        SourceKind::WebSocket => {
            let host = config
                .host
                .as_deref()
                .filter(|h| !h.is_empty())
                .ok_or(MonitorError::IncompleteSource("host"))?;
            Arc::new(WebSocketSource::new(host))
        }
        SourceKind::Tcp => {
            let address = config
                .address
                .as_deref()
                .filter(|a| !a.is_empty())
                .ok_or(MonitorError::IncompleteSource("address"))?;
            Arc::new(TcpJsonSource::new(address))
        }
        SourceKind::File => {
            let path = config.path.as_ref().ok_or(MonitorError::IncompleteSource("path"))?;
            Arc::new(FileReplaySource::new(path.clone()))
        }
    };
    Ok(source)
}

/// Status document source for a configuration, if any.
///
/// An explicit `status_url` or `status_document` wins; otherwise a websocket
/// source polls the status API of the same ankerctl host.
pub fn status_source_from_config(config: &Config) -> Option<Arc<dyn StatusDocumentSource>> {
    if let Some(url) = &config.monitor.status_url {
        return Some(Arc::new(HttpStatusDocument::new(url.clone())));
    }
    if let Some(path) = &config.monitor.status_document {
        return Some(Arc::new(FileStatusDocument::new(path.clone())));
    }
    match (config.source.kind, config.source.host.as_deref()) {
        (SourceKind::WebSocket, Some(host)) if !host.is_empty() => Some(Arc::new(HttpStatusDocument::for_host(host))),
        _ => None,
    }
}

/// Counters for one ingestion session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub dispatched: u64,
    /// Well-formed messages of a kind the engine does not know.
    pub rejected: u64,
    /// Lines that could not be decoded.
    pub skipped: u64,
}

/// Feed every record of one source session into the engine.
///
/// Bad messages are logged and skipped; only a transport error ends the
/// session early.
pub async fn ingest(engine: &SharedEngine, source: &dyn EventSource) -> Result<IngestStats, SourceError> {
    let mut stream = source.open().await?;
    let mut stats = IngestStats::default();

    while let Some(item) = stream.next().await {
        match item {
            Ok(record) => {
                let result = engine.write().await.dispatch(&record);
                match result {
                    Ok(()) => stats.dispatched += 1,
                    Err(e) => {
                        tracing::warn!("{} ({:?})", e, record.fields);
                        stats.rejected += 1;
                    }
                }
            }
            Err(e) if e.is_per_message() => {
                tracing::warn!("Skipping undecodable message: {}", e);
                stats.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(stats)
}

#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    /// How often the status document is polled and status re-evaluated.
    pub poll_interval: Duration,
    /// Delay before a finished ingestion task is restarted.
    pub restart_backoff: Duration,
}

impl From<&MonitorConfig> for MonitorSettings {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            restart_backoff: Duration::from_secs(config.restart_backoff_secs),
        }
    }
}

/// Keeps an ingestion task alive for one printer and periodically refreshes
/// derived state.
pub struct Monitor {
    engine: SharedEngine,
    source: Arc<dyn EventSource>,
    status_source: Option<Arc<dyn StatusDocumentSource>>,
    settings: MonitorSettings,
    shutdown_tx: broadcast::Sender<()>,
}

impl Monitor {
    pub fn new(engine: SharedEngine, source: Arc<dyn EventSource>, settings: MonitorSettings) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            engine,
            source,
            status_source: None,
            settings,
            shutdown_tx,
        }
    }

    pub fn with_status_source(mut self, status_source: Arc<dyn StatusDocumentSource>) -> Self {
        self.status_source = Some(status_source);
        self
    }

    pub fn engine(&self) -> SharedEngine {
        self.engine.clone()
    }

    /// Sending on the returned channel stops [`Monitor::run`].
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    fn spawn_ingest(&self) -> JoinHandle<Result<IngestStats, SourceError>> {
        let engine = self.engine.clone();
        let source = self.source.clone();
        tracing::info!("Starting message ingestion from {}", source.describe());
        tokio::spawn(async move { ingest(&engine, source.as_ref()).await })
    }

    async fn refresh(&self) {
        if let Some(status_source) = &self.status_source {
            match status_source.fetch().await {
                Ok(document) => self.engine.write().await.set_status_document(document),
                Err(e) => tracing::debug!("Status document unavailable: {}", e),
            }
        }
        // Staleness is only noticed on evaluation, so do it even when nobody
        // is reading.
        self.engine.write().await.evaluate_and_transition();
    }

    pub async fn run(self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut interval = tokio::time::interval(self.settings.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut task = Some(self.spawn_ingest());
        let mut restart_at: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    tracing::info!("Monitor shutting down");
                    if let Some(task) = task.take() {
                        task.abort();
                    }
                    break;
                }
                result = join(&mut task) => {
                    task = None;
                    match result {
                        Ok(Ok(stats)) => tracing::warn!(
                            "Message stream ended ({} dispatched, {} rejected, {} skipped)",
                            stats.dispatched, stats.rejected, stats.skipped
                        ),
                        Ok(Err(e)) => tracing::error!("Message ingestion failed: {}", e),
                        Err(e) => tracing::error!("Message ingestion task panicked: {}", e),
                    }
                    tracing::info!("Restarting ingestion in {:?}", self.settings.restart_backoff);
                    restart_at = Some(Instant::now() + self.settings.restart_backoff);
                }
                _ = wait_until(restart_at) => {
                    restart_at = None;
                    task = Some(self.spawn_ingest());
                }
                _ = interval.tick() => self.refresh().await,
            }
        }
    }
}

async fn join<T>(task: &mut Option<JoinHandle<T>>) -> Result<T, JoinError> {
    match task {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
