//! Inbound plumbing: the message subscription and the polled status document.

pub mod event_source;
pub mod status_source;

pub use event_source::{
    EventSource, FileReplaySource, MAX_LINE_LENGTH, RecordStream, SourceError, TcpJsonSource, WebSocketSource,
    json_lines, json_lines_with_max_length, mqtt_websocket_url,
};
pub use status_source::{FileStatusDocument, HttpStatusDocument, StatusDocumentSource, status_api_url};
