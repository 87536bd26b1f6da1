use async_trait::async_trait;
use bytes::BytesMut;
use futures::StreamExt;
use futures::stream::BoxStream;
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

use crate::protocol::EventRecord;

/// Longest accepted message line, in bytes.
pub const MAX_LINE_LENGTH: usize = 256 * 1024;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Message line longer than {max} bytes")]
    LineTooLong { max: usize },
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SourceError {
    /// Errors that spoil a single message but leave the stream usable.
    pub fn is_per_message(&self) -> bool {
        matches!(self, SourceError::Decode(_) | SourceError::LineTooLong { .. })
    }
}

/// Stream of decoded records. Per-message errors (see
/// [`SourceError::is_per_message`]) affect only that message; any other error
/// is always the last item.
pub type RecordStream = BoxStream<'static, Result<EventRecord, SourceError>>;

/// Something that can (re)open a subscription to the printer's messages.
#[async_trait]
pub trait EventSource: Send + Sync {
    fn describe(&self) -> String;
    async fn open(&self) -> Result<RecordStream, SourceError>;
}

/// Decode newline-delimited JSON messages. Blank lines are skipped.
pub fn json_lines<R>(reader: R) -> RecordStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    json_lines_with_max_length(reader, MAX_LINE_LENGTH)
}

/// [`json_lines`] with an explicit line cap. An overlong line is reported as
/// [`SourceError::LineTooLong`] and discarded up to the next newline.
pub fn json_lines_with_max_length<R>(mut reader: R, max: usize) -> RecordStream
where
    R: AsyncRead + Unpin + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut codec = LinesCodec::new_with_max_length(max);
        let mut buf = BytesMut::with_capacity(8 * 1024);
        let mut eof = false;
        loop {
            let decoded = if eof {
                codec.decode_eof(&mut buf)
            } else {
                codec.decode(&mut buf)
            };
            match decoded {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        yield EventRecord::from_json(line).map_err(SourceError::from);
                    }
                    continue;
                }
                Ok(None) if eof => break,
                Ok(None) => {}
                Err(LinesCodecError::MaxLineLengthExceeded) => {
                    yield Err(SourceError::LineTooLong { max });
                    continue;
                }
                Err(LinesCodecError::Io(e)) => {
                    yield Err(SourceError::Io(e));
                    break;
                }
            }

            match reader.read_buf(&mut buf).await {
                Ok(0) => eof = true,
                Ok(_) => {}
                Err(e) => {
                    yield Err(SourceError::Io(e));
                    break;
                }
            }
        }
    })
}

/// `ws://host:port/ws/mqtt` for an ankerctl base URL.
pub fn mqtt_websocket_url(host: &str) -> String {
    format!("{}/ws/mqtt", host.trim_end_matches('/'))
}

/// ankerctl's MQTT relay: one JSON message per text frame.
#[derive(Debug, Clone)]
pub struct WebSocketSource {
    url: String,
}

impl WebSocketSource {
    /// `host` is the ankerctl base URL, e.g. `ws://127.0.0.1:4470`.
    pub fn new(host: &str) -> Self {
        Self {
            url: mqtt_websocket_url(host),
        }
    }
}

#[async_trait]
impl EventSource for WebSocketSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn open(&self) -> Result<RecordStream, SourceError> {
        let (mut ws, _) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        tracing::info!("Connected to MQTT relay at {}", self.url);
        Ok(Box::pin(async_stream::stream! {
            while let Some(message) = ws.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        yield EventRecord::from_json(text.as_str()).map_err(SourceError::from);
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        yield Err(SourceError::WebSocket(e));
                        break;
                    }
                }
            }
        }))
    }
}

/// Plain TCP relay that pushes one JSON message per line.
#[derive(Debug, Clone)]
pub struct TcpJsonSource {
    address: String,
}

impl TcpJsonSource {
    pub fn new(address: impl Into<String>) -> Self {
        Self { address: address.into() }
    }
}

#[async_trait]
impl EventSource for TcpJsonSource {
    fn describe(&self) -> String {
        format!("tcp://{}", self.address)
    }

    async fn open(&self) -> Result<RecordStream, SourceError> {
        let stream = tokio::net::TcpStream::connect(&self.address).await?;
        tracing::info!("Connected to message relay at {}", self.address);
        Ok(json_lines(stream))
    }
}

/// Recorded trace of messages, one JSON object per line.
#[derive(Debug, Clone)]
pub struct FileReplaySource {
    path: PathBuf,
}

impl FileReplaySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl EventSource for FileReplaySource {
    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }

    async fn open(&self) -> Result<RecordStream, SourceError> {
        let file = tokio::fs::File::open(&self.path).await?;
        Ok(json_lines(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_json_lines_skips_blank_and_reports_bad_lines() {
        let input: &'static [u8] = b"{\"commandType\": 1003, \"currentTemp\": 2050}\n\nnot json\n{\"commandType\": 1052}\n";
        let items: Vec<_> = json_lines(input).collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().kind, 1003);
        assert!(matches!(items[1], Err(SourceError::Decode(_))));
        assert_eq!(items[2].as_ref().unwrap().kind, 1052);
    }

    #[tokio::test]
    async fn test_overlong_line_is_skipped() {
        let long = "x".repeat(500);
        let input = format!(
            "{{\"commandType\": 1003, \"currentTemp\": 2050}}\n{long}\n{{\"commandType\": 1052}}"
        );
        let items: Vec<_> = json_lines_with_max_length(std::io::Cursor::new(input.into_bytes()), 128)
            .collect()
            .await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap().kind, 1003);
        assert!(matches!(items[1], Err(SourceError::LineTooLong { max: 128 })));
        assert!(items[1].as_ref().unwrap_err().is_per_message());
        // The last line has no trailing newline.
        assert_eq!(items[2].as_ref().unwrap().kind, 1052);
    }

    #[test]
    fn test_mqtt_websocket_url() {
        assert_eq!(mqtt_websocket_url("ws://127.0.0.1:4470"), "ws://127.0.0.1:4470/ws/mqtt");
        assert_eq!(mqtt_websocket_url("ws://printer.lan:4470/"), "ws://printer.lan:4470/ws/mqtt");
    }
}
