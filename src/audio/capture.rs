//! Real audio capture using CPAL (Cross-Platform Audio Library).

use crate::audio::source::{AudioSource, SampleBlock};
use crate::error::{MicstreamError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Preferred device names for desktop PipeWire/PulseAudio environments.
const PREFERRED_DEVICES: &[&str] = &["pipewire", "pulse", "PulseAudio"];

/// Device name patterns to filter out (not useful for microphone input).
const FILTERED_PATTERNS: &[&str] = &[
    "surround",
    "front:",
    "rear:",
    "center:",
    "side:",
    "Digital Output",
    "HDMI",
    "S/PDIF",
];

/// Run `f` with stderr redirected to /dev/null.
///
/// ALSA prints configuration warnings straight to stderr while cpal probes
/// backends and devices; this keeps them out of the CLI output.
fn with_suppressed_stderr<T>(f: impl FnOnce() -> T) -> T {
    use std::os::unix::io::AsRawFd;

    let stderr_fd = std::io::stderr().as_raw_fd();
    let saved = unsafe { libc::dup(stderr_fd) };
    if saved < 0 {
        return f();
    }

    let devnull = std::fs::OpenOptions::new().write(true).open("/dev/null");
    let Ok(devnull) = devnull else {
        unsafe { libc::close(saved) };
        return f();
    };

    unsafe { libc::dup2(devnull.as_raw_fd(), stderr_fd) };
    let result = f();
    unsafe {
        libc::dup2(saved, stderr_fd);
        libc::close(saved);
    }
    result
}

/// Check if a device name should be filtered out.
fn should_filter_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    FILTERED_PATTERNS
        .iter()
        .any(|pattern| lower.contains(&pattern.to_lowercase()))
}

/// Check if a device is a preferred device.
fn is_preferred_device(name: &str) -> bool {
    let lower = name.to_lowercase();
    PREFERRED_DEVICES
        .iter()
        .any(|pref| lower.contains(&pref.to_lowercase()))
}

/// List all available audio input devices with filtering and recommendations.
///
/// # Returns
/// A vector of device names, with preferred devices marked with "\[recommended\]".
/// Filters out obviously unusable devices (surround channels, HDMI, etc.).
///
/// # Errors
/// Returns `MicstreamError::AudioCapture` if device enumeration fails.
pub fn list_devices() -> Result<Vec<String>> {
    with_suppressed_stderr(|| {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| MicstreamError::AudioCapture {
                message: format!("Failed to enumerate input devices: {}", e),
            })?;

        let mut device_names = Vec::new();
        for device in devices {
            if let Ok(name) = device.name() {
                if should_filter_device(&name) {
                    continue;
                }

                if is_preferred_device(&name) {
                    device_names.push(format!("{} [recommended]", name));
                } else {
                    device_names.push(name);
                }
            }
        }

        Ok(device_names)
    })
}

/// Get the best default input device, preferring PipeWire/PulseAudio.
///
/// This ensures we respect the desktop's audio device selection.
fn get_best_default_device() -> Result<cpal::Device> {
    let host = cpal::default_host();

    if let Ok(devices) = host.input_devices() {
        for device in devices {
            if let Ok(name) = device.name()
                && is_preferred_device(&name)
            {
                return Ok(device);
            }
        }
    }

    host.default_input_device()
        .ok_or_else(|| MicstreamError::AudioDeviceNotFound {
            device: "default".to_string(),
        })
}

/// Wrapper for cpal::Stream to make it Send.
///
/// SAFETY: We ensure that the stream is only accessed from a single thread at
/// a time through the Mutex wrapper in CpalAudioSource. The stream methods are
/// called synchronously and don't cross thread boundaries unsafely.
struct SendableStream(cpal::Stream);

unsafe impl Send for SendableStream {}

/// Per-channel sample staging area shared with the cpal callback.
type ChannelBuffers = Arc<Mutex<Vec<Vec<f32>>>>;

/// Real microphone capture implementation using CPAL.
///
/// Opens the device at the session's exact sample rate and channel count;
/// there is no resampling path. Devices exposing only integer formats get
/// their samples widened to f32, which is a pure format conversion. The
/// callback deinterleaves incoming frames into per-channel staging buffers;
/// `read_block` drains those into one [`SampleBlock`].
pub struct CpalAudioSource {
    device: cpal::Device,
    stream: Arc<Mutex<Option<SendableStream>>>,
    buffers: ChannelBuffers,
    channels: u16,
    sample_rate: u32,
}

impl CpalAudioSource {
    /// Create a new CPAL audio source.
    ///
    /// # Arguments
    /// * `device_name` - Optional device name. If None, uses the default input device.
    /// * `channels` - Channel count to capture (1 or 2).
    /// * `sample_rate` - Sample rate in Hz.
    ///
    /// # Errors
    /// Returns errors if the device is not found or the channel count is
    /// unsupported.
    pub fn new(device_name: Option<&str>, channels: u16, sample_rate: u32) -> Result<Self> {
        if channels == 0 || channels > 2 {
            return Err(MicstreamError::UnsupportedChannelCount { channels });
        }
        if sample_rate == 0 {
            return Err(MicstreamError::InvalidSampleRate { rate: sample_rate });
        }

        let device = with_suppressed_stderr(|| {
            if let Some(name) = device_name {
                let host = cpal::default_host();
                let devices = host
                    .input_devices()
                    .map_err(|e| MicstreamError::AudioCapture {
                        message: format!("Failed to enumerate devices: {}", e),
                    })?;

                let mut found_device = None;
                for dev in devices {
                    if let Ok(dev_name) = dev.name()
                        && dev_name == name
                    {
                        found_device = Some(dev);
                        break;
                    }
                }

                found_device.ok_or_else(|| MicstreamError::AudioDeviceNotFound {
                    device: name.to_string(),
                })
            } else {
                get_best_default_device()
            }
        })?;

        Ok(Self {
            device,
            stream: Arc::new(Mutex::new(None)),
            buffers: Arc::new(Mutex::new(vec![Vec::new(); channels as usize])),
            channels,
            sample_rate,
        })
    }

    /// Build the input stream at the requested format.
    ///
    /// Tries f32 first (the native format of most desktop audio servers),
    /// then i16 with widening. No fallback to a different rate or channel
    /// count — the session format is a hard requirement.
    fn build_stream(&self) -> Result<cpal::Stream> {
        let config = cpal::StreamConfig {
            channels: self.channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let err_callback = |err| {
            eprintln!("micstream: audio stream error: {}", err);
        };

        let num_channels = self.channels as usize;

        let buffers = Arc::clone(&self.buffers);
        if let Ok(stream) = self.device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                stage_frames(&buffers, data, num_channels);
            },
            err_callback,
            None,
        ) {
            return Ok(stream);
        }

        let buffers = Arc::clone(&self.buffers);
        self.device
            .build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let widened: Vec<f32> =
                        data.iter().map(|&s| s as f32 / 32768.0).collect();
                    stage_frames(&buffers, &widened, num_channels);
                },
                err_callback,
                None,
            )
            .map_err(|_| MicstreamError::AudioFormatMismatch {
                expected: format!("{}ch/{}Hz f32 or i16", self.channels, self.sample_rate),
                actual: "no supported input stream config".to_string(),
            })
    }
}

/// Deinterleave whole frames into the per-channel staging buffers.
///
/// A trailing partial frame is dropped; cpal delivers whole frames in
/// practice, and dropping keeps the equal-length invariant across channels.
fn stage_frames(buffers: &ChannelBuffers, data: &[f32], num_channels: usize) {
    if let Ok(mut staged) = buffers.lock() {
        for frame in data.chunks_exact(num_channels) {
            for (channel, &sample) in staged.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
    }
}

impl AudioSource for CpalAudioSource {
    fn start(&mut self) -> Result<()> {
        {
            let stream_guard = self
                .stream
                .lock()
                .map_err(|e| MicstreamError::AudioCapture {
                    message: format!("Failed to lock stream: {}", e),
                })?;
            if stream_guard.is_some() {
                return Ok(()); // Already started
            }
        }

        let stream = self.build_stream()?;
        stream.play().map_err(|e| MicstreamError::AudioCapture {
            message: format!("Failed to start audio stream: {}", e),
        })?;

        let mut stream_guard = self
            .stream
            .lock()
            .map_err(|e| MicstreamError::AudioCapture {
                message: format!("Failed to lock stream: {}", e),
            })?;
        *stream_guard = Some(SendableStream(stream));
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut stream_guard = self
            .stream
            .lock()
            .map_err(|e| MicstreamError::AudioCapture {
                message: format!("Failed to lock stream: {}", e),
            })?;

        if let Some(sendable_stream) = stream_guard.take() {
            sendable_stream
                .0
                .pause()
                .map_err(|e| MicstreamError::AudioCapture {
                    message: format!("Failed to stop audio stream: {}", e),
                })?;
        }
        Ok(())
    }

    fn read_block(&mut self) -> Result<Option<SampleBlock>> {
        let mut staged = self
            .buffers
            .lock()
            .map_err(|e| MicstreamError::AudioCapture {
                message: format!("Failed to lock audio buffers: {}", e),
            })?;

        if staged.iter().all(Vec::is_empty) {
            return Ok(None);
        }

        let channels: Vec<Vec<f32>> = staged.iter_mut().map(std::mem::take).collect();
        drop(staged);

        Ok(Some(SampleBlock::new(channels)?))
    }

    fn channels(&self) -> u16 {
        self.channels
    }
}
