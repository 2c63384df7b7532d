//! The capture pipeline: source thread, control loop, and sink delivery.
//!
//! Layout mirrors the data flow: a dedicated OS thread polls the audio
//! source and forwards blocks over a bounded tokio channel; an async control
//! loop drives the [`CaptureController`] and hands encoded flushes to the
//! sink. Sink failures are reported and capture continues; only a broken
//! session (format change mid-stream) aborts the pipeline.

use crate::audio::source::AudioSource;
use crate::capture::controller::{CaptureController, FlushPolicy};
use crate::capture::message::{CaptureEvent, CaptureMessage};
use crate::defaults;
use crate::error::Result;
use crate::transport::{EncodedBlock, TransportSink};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Handle for stopping a running capture pipeline.
#[derive(Debug, Clone)]
pub struct CapturePipelineHandle {
    running: Arc<AtomicBool>,
}

impl CapturePipelineHandle {
    /// Signal the capture thread to stop.
    ///
    /// The pipeline drains in-flight blocks, emits the final flush, closes
    /// the sink, and then its join handle resolves. Idempotent.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Whether the capture thread is still being asked to run.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct CapturePipeline {
    pub sample_rate: u32,
    pub policy: FlushPolicy,
}

impl CapturePipeline {
    pub fn new(sample_rate: u32, policy: FlushPolicy) -> Self {
        Self {
            sample_rate,
            policy,
        }
    }

    /// Start capturing from `source` and delivering flushes to `sink`.
    ///
    /// The source is started before any thread spawns so setup failures
    /// surface here rather than inside the pipeline. Returns a stop handle
    /// and the join handle of the control loop; the loop exits on `stop()`,
    /// or on its own once a finite source runs dry.
    pub fn start<S, T>(
        self,
        mut source: S,
        sink: T,
        events: crossbeam_channel::Sender<CaptureEvent>,
    ) -> Result<(CapturePipelineHandle, tokio::task::JoinHandle<Result<()>>)>
    where
        S: AudioSource + 'static,
        T: TransportSink + 'static,
    {
        let mut controller = CaptureController::new(source.channels(), self.sample_rate, self.policy)?;
        controller.begin()?;

        source.start()?;

        let running = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::channel::<CaptureMessage>(defaults::CHANNEL_BUFFER_SIZE);

        let capture_running = Arc::clone(&running);
        std::thread::spawn(move || {
            capture_loop(source, tx, capture_running);
        });

        let join = tokio::spawn(control_loop(rx, controller, sink, events));

        Ok((CapturePipelineHandle { running }, join))
    }
}

/// Poll the source on a dedicated thread, forwarding blocks to the conduit.
fn capture_loop<S: AudioSource>(
    mut source: S,
    tx: mpsc::Sender<CaptureMessage>,
    running: Arc<AtomicBool>,
) {
    let poll_interval = Duration::from_millis(defaults::POLL_INTERVAL_MS);

    while running.load(Ordering::Relaxed) {
        match source.read_block() {
            Ok(Some(block)) => {
                // Receiver gone means the control loop is shutting down.
                if tx.blocking_send(CaptureMessage::Record(block)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                if source.is_finite() {
                    break;
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                let _ = tx.blocking_send(CaptureMessage::Log(format!("audio read error: {}", e)));
                std::thread::sleep(poll_interval);
            }
        }
    }

    if let Err(e) = source.stop() {
        let _ = tx.blocking_send(CaptureMessage::Log(format!("audio stop error: {}", e)));
    }
    // tx drops here; the control loop sees the channel close and finalizes.
}

/// Drive the controller and deliver encoded flushes to the sink.
async fn control_loop<T: TransportSink>(
    mut rx: mpsc::Receiver<CaptureMessage>,
    mut controller: CaptureController,
    mut sink: T,
    events: crossbeam_channel::Sender<CaptureEvent>,
) -> Result<()> {
    while let Some(message) = rx.recv().await {
        match message {
            CaptureMessage::Record(block) => {
                if controller.discards_input() {
                    notify(
                        &events,
                        CaptureEvent::BufferDiscarded {
                            message: "block received outside recording state".to_string(),
                        },
                    );
                    continue;
                }
                // An invariant violation drops the offending buffer contents
                // (the flush already drained them) and capture continues.
                match controller.record(block) {
                    Ok(Some(encoded)) => deliver(&mut sink, encoded, &events).await,
                    Ok(None) => {}
                    Err(e) => notify(
                        &events,
                        CaptureEvent::BufferDiscarded {
                            message: e.to_string(),
                        },
                    ),
                }
            }
            CaptureMessage::Log(line) => {
                eprintln!("micstream: {}", line);
            }
        }
    }

    // Capture thread is done; drain the remainder and release the sink.
    match controller.stop() {
        Ok(Some(final_block)) => deliver(&mut sink, final_block, &events).await,
        Ok(None) => {}
        Err(e) => notify(
            &events,
            CaptureEvent::BufferDiscarded {
                message: e.to_string(),
            },
        ),
    }
    if let Err(e) = sink.close().await {
        eprintln!("micstream: failed to close {} sink: {}", sink.name(), e);
    }
    notify(&events, CaptureEvent::Stopped);
    Ok(())
}

/// Hand one block to the sink; a refusal is reported, never fatal.
async fn deliver<T: TransportSink>(
    sink: &mut T,
    block: EncodedBlock,
    events: &crossbeam_channel::Sender<CaptureEvent>,
) {
    let bytes = block.len();
    match sink.send(block).await {
        Ok(()) => notify(events, CaptureEvent::Flushed { bytes }),
        Err(e) => {
            eprintln!("micstream: {} sink rejected {} bytes: {}", sink.name(), bytes, e);
            notify(
                events,
                CaptureEvent::TransportError {
                    message: e.to_string(),
                },
            );
        }
    }
}

/// Non-blocking event notification; observers may lag or be absent.
fn notify(events: &crossbeam_channel::Sender<CaptureEvent>, event: CaptureEvent) {
    let _ = events.try_send(event);
}
