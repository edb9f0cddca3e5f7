//! WebSocket connection seam
//!
//! The channel task only sees text frames. [`TungsteniteConnector`] is the
//! network implementation; tests supply an in-memory one.

use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt, future};
use std::pin::Pin;
use tokio_tungstenite::tungstenite::{self, Message};

use crate::error::{ClientError, ClientResult};

pub type FrameSink = Pin<Box<dyn Sink<String, Error = ClientError> + Send>>;
pub type FrameStream = Pin<Box<dyn Stream<Item = ClientResult<String>> + Send>>;

/// An open connection split into its halves
pub struct SocketConnection {
    pub sink: FrameSink,
    pub stream: FrameStream,
}

impl SocketConnection {
    pub fn new(
        sink: impl Sink<String, Error = ClientError> + Send + 'static,
        stream: impl Stream<Item = ClientResult<String>> + Send + 'static,
    ) -> Self {
        Self {
            sink: Box::pin(sink),
            stream: Box::pin(stream),
        }
    }
}

#[async_trait]
pub trait SocketConnector: Send + Sync + 'static {
    async fn connect(&self) -> ClientResult<SocketConnection>;
}

/// Network connector over tokio-tungstenite
#[derive(Debug, Clone)]
pub struct TungsteniteConnector {
    url: String,
}

impl TungsteniteConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SocketConnector for TungsteniteConnector {
    async fn connect(&self) -> ClientResult<SocketConnection> {
        let (ws, _response) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(|e| ClientError::Realtime(format!("connect to {} failed: {e}", self.url)))?;
        tracing::debug!(url = %self.url, "WebSocket connected");

        let (ws_sink, ws_stream) = ws.split();
        let sink = ws_sink
            .with(|text: String| future::ready(Ok::<_, tungstenite::Error>(Message::Text(text.into()))))
            .sink_map_err(|e| ClientError::Realtime(e.to_string()));
        // protocol-level pings are answered by tungstenite itself
        let stream = ws_stream.filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Close(frame)) => Some(Err(ClientError::Realtime(format!(
                    "closed by server: {frame:?}"
                )))),
                Ok(_) => None,
                Err(e) => Some(Err(ClientError::Realtime(e.to_string()))),
            })
        });
        Ok(SocketConnection::new(sink, stream))
    }
}
