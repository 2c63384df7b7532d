//! Transport sinks for encoded audio blocks.
//!
//! The capture pipeline hands every flushed block to a [`TransportSink`];
//! implementations cover WebSocket streaming, HTTP multipart upload, and
//! local WAV files. Sinks own their connection state and report failures as
//! `Transport` errors, which the pipeline treats as non-fatal.

pub mod file;
pub mod upload;
pub mod websocket;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub use file::WavFileSink;
pub use upload::HttpUploadSink;
pub use websocket::WebSocketSink;

/// One flushed, encoded audio block ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedBlock {
    /// Raw 16-bit little-endian PCM bytes (streaming flushes).
    Pcm(Vec<u8>),
    /// A complete WAV byte stream, header included (batch stop flush).
    Wav(Vec<u8>),
}

impl EncodedBlock {
    /// Borrows the encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            EncodedBlock::Pcm(bytes) | EncodedBlock::Wav(bytes) => bytes,
        }
    }

    /// Consumes the block, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            EncodedBlock::Pcm(bytes) | EncodedBlock::Wav(bytes) => bytes,
        }
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Returns true if the block carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// Returns true for WAV-framed blocks.
    pub fn is_wav(&self) -> bool {
        matches!(self, EncodedBlock::Wav(_))
    }
}

/// Trait for delivery of encoded blocks.
///
/// This trait allows swapping implementations (network transports, local
/// files, or a mock in tests). `send` consumes the block; a failed send
/// does not poison the sink, the caller may retry with the next block.
#[async_trait]
pub trait TransportSink: Send {
    /// Deliver one encoded block.
    async fn send(&mut self, block: EncodedBlock) -> Result<()>;

    /// Flush and release the underlying resource.
    ///
    /// Called once when the pipeline shuts down; idempotent.
    async fn close(&mut self) -> Result<()>;

    /// Short human-readable name for log lines.
    fn name(&self) -> &str;
}

#[async_trait]
impl TransportSink for Box<dyn TransportSink> {
    async fn send(&mut self, block: EncodedBlock) -> Result<()> {
        (**self).send(block).await
    }

    async fn close(&mut self) -> Result<()> {
        (**self).close().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Mock sink that records every delivered block.
///
/// Clone it before handing it to the pipeline to keep a handle on the
/// captured blocks.
#[derive(Debug, Clone, Default)]
pub struct MockSink {
    sent: Arc<Mutex<Vec<EncodedBlock>>>,
    closed: Arc<Mutex<bool>>,
    should_fail_send: bool,
}

impl MockSink {
    /// Create a mock sink that accepts every block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail every send.
    pub fn with_send_failure(mut self) -> Self {
        self.should_fail_send = true;
        self
    }

    /// Blocks delivered so far, in order.
    pub fn sent_blocks(&self) -> Vec<EncodedBlock> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.lock().map(|c| *c).unwrap_or(false)
    }
}

#[async_trait]
impl TransportSink for MockSink {
    async fn send(&mut self, block: EncodedBlock) -> Result<()> {
        if self.should_fail_send {
            return Err(crate::error::MicstreamError::Transport {
                message: "mock send failure".to_string(),
            });
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(block);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Ok(mut closed) = self.closed.lock() {
            *closed = true;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
