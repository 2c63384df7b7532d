//! WebSocket transport: streams encoded blocks as binary messages.

use crate::error::{MicstreamError, Result};
use crate::transport::{EncodedBlock, TransportSink};
use async_trait::async_trait;
use futures_util::SinkExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Streams every block as one binary WebSocket message.
///
/// The connection is established up front so a bad URL fails before any
/// audio is captured, not on the first flush.
pub struct WebSocketSink {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    url: String,
}

impl WebSocketSink {
    /// Connect to the given `ws://` or `wss://` URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) =
            connect_async(url)
                .await
                .map_err(|e| MicstreamError::Transport {
                    message: format!("WebSocket connect to {} failed: {}", url, e),
                })?;

        eprintln!("micstream: connected to {}", url);
        Ok(Self {
            stream,
            url: url.to_string(),
        })
    }

    /// The URL this sink is connected to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TransportSink for WebSocketSink {
    async fn send(&mut self, block: EncodedBlock) -> Result<()> {
        self.stream
            .send(Message::Binary(block.into_bytes()))
            .await
            .map_err(|e| MicstreamError::Transport {
                message: format!("WebSocket send failed: {}", e),
            })
    }

    async fn close(&mut self) -> Result<()> {
        use tokio_tungstenite::tungstenite::Error as WsError;

        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            // Peer may have closed first; not an error on shutdown.
            Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => Ok(()),
            Err(e) => Err(MicstreamError::Transport {
                message: format!("WebSocket close failed: {}", e),
            }),
        }
    }

    fn name(&self) -> &str {
        "websocket"
    }
}
