//! Messages flowing through the capture pipeline.

use crate::audio::source::SampleBlock;

/// Message from the capture thread to the async control loop.
#[derive(Debug, Clone)]
pub enum CaptureMessage {
    /// One sample block read from the audio source.
    Record(SampleBlock),
    /// A log line from the capture thread (it has no other output path).
    Log(String),
}

/// Notification emitted by the control loop for observers.
///
/// Delivered over a bounded crossbeam channel with `try_send`; a slow or
/// absent observer never blocks the audio path.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureEvent {
    /// A flush was encoded and handed to the sink.
    Flushed { bytes: usize },
    /// The sink rejected a block; capture continues.
    TransportError { message: String },
    /// A sample block was dropped before reaching the buffer.
    BufferDiscarded { message: String },
    /// The pipeline has shut down and the sink is closed.
    Stopped,
}
