//! Printer state: the snapshot, its synthesized status and the engine that
//! keeps both up to date from the message stream.

pub mod engine;
pub mod handlers;
pub mod snapshot;
pub mod status;
pub mod status_document;

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

pub use engine::{DEFAULT_HEARTBEAT_TIMEOUT, PrinterEngine};
pub use snapshot::{AiSettings, PrinterSnapshot};
pub use status::PrinterStatus;
pub use status_document::StatusDocument;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unrecognized message kind: {kind}")]
    UnrecognizedEvent { kind: u32 },
}

/// One engine per device, shared between the ingestion task and readers.
///
/// Status evaluation mutates bookkeeping, so it needs the write half.
pub type SharedEngine = Arc<RwLock<PrinterEngine>>;

pub fn shared(engine: PrinterEngine) -> SharedEngine {
    Arc::new(RwLock::new(engine))
}
