//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "micstream",
    about = "Capture microphone audio and stream it as PCM or WAV",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (default: ~/.config/micstream/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Audio input device name (see `micstream devices`)
    #[arg(short, long, global = true)]
    pub device: Option<String>,

    /// Use a white-noise generator instead of a real microphone
    #[arg(long, global = true)]
    pub noise: bool,

    /// Sample rate in Hz
    #[arg(long, global = true)]
    pub sample_rate: Option<u32>,

    /// Channel count (1 = mono, 2 = stereo)
    #[arg(long, global = true)]
    pub channels: Option<u16>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream raw PCM flushes over a WebSocket connection
    Stream {
        /// WebSocket URL (overrides config)
        #[arg(long)]
        url: Option<String>,
    },

    /// Record until interrupted, then upload one WAV via HTTP multipart
    Upload {
        /// Upload endpoint URL (overrides config)
        #[arg(long)]
        url: Option<String>,
    },

    /// Record until interrupted and write a WAV file locally
    Record {
        /// Output file path (default: timestamped file in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available audio input devices
    Devices,
}
