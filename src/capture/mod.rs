//! Capture control: session state, flush policy, and the pipeline runner.

pub mod controller;
pub mod message;
pub mod pipeline;

pub use controller::{CaptureController, FlushPolicy, SessionState};
pub use message::{CaptureEvent, CaptureMessage};
pub use pipeline::{CapturePipeline, CapturePipelineHandle};
