use anyhow::Result;
use clap::Parser;
use micstream::audio::noise::NoiseAudioSource;
use micstream::audio::source::AudioSource;
use micstream::capture::{CaptureEvent, CapturePipeline, FlushPolicy};
use micstream::cli::{Cli, Commands};
use micstream::config::Config;
use micstream::transport::{HttpUploadSink, TransportSink, WavFileSink, WebSocketSink};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    config.validate()?;

    match cli.command {
        Commands::Stream { ref url } => {
            let url = url.clone().unwrap_or_else(|| config.transport.websocket_url.clone());
            let sink = WebSocketSink::connect(&url).await?;
            let policy = FlushPolicy::Threshold(config.audio.flush_threshold);
            run_pipeline(&cli, &config, Box::new(sink), policy).await?;
        }
        Commands::Upload { ref url } => {
            let url = url.clone().unwrap_or_else(|| config.transport.upload_url.clone());
            let sink = HttpUploadSink::new(&url, &config.transport.upload_field);
            run_pipeline(&cli, &config, Box::new(sink), FlushPolicy::OnStop).await?;
        }
        Commands::Record { ref output } => {
            let sink = match output {
                Some(path) => WavFileSink::to_path(
                    path.clone(),
                    config.audio.sample_rate,
                    config.audio.channels,
                ),
                None => WavFileSink::to_dir(".", config.audio.sample_rate, config.audio.channels),
            };
            run_pipeline(&cli, &config, Box::new(sink), FlushPolicy::OnStop).await?;
        }
        Commands::Devices => {
            list_audio_devices()?;
        }
    }

    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Priority order:
/// 1. CLI flags (--device, --sample-rate, --channels)
/// 2. `MICSTREAM_*` environment variables
/// 3. Config file (--config path or ~/.config/micstream/config.toml)
/// 4. Built-in defaults
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(ref path) = cli.config {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    }
    .with_env_overrides();

    if let Some(ref device) = cli.device {
        config.audio.device = Some(device.clone());
    }
    if let Some(rate) = cli.sample_rate {
        config.audio.sample_rate = rate;
    }
    if let Some(channels) = cli.channels {
        config.audio.channels = channels;
    }

    Ok(config)
}

/// Build the audio source the CLI asked for.
fn build_source(cli: &Cli, config: &Config) -> Result<Box<dyn AudioSource>> {
    if cli.noise {
        return Ok(Box::new(NoiseAudioSource::new(
            config.audio.channels,
            config.audio.sample_rate,
        )));
    }

    #[cfg(feature = "cpal-audio")]
    {
        let source = micstream::audio::capture::CpalAudioSource::new(
            config.audio.device.as_deref(),
            config.audio.channels,
            config.audio.sample_rate,
        )?;
        Ok(Box::new(source))
    }

    #[cfg(not(feature = "cpal-audio"))]
    {
        anyhow::bail!(
            "built without the cpal-audio feature; use --noise or rebuild with default features"
        )
    }
}

/// Run one capture session until the source ends or Ctrl+C arrives.
async fn run_pipeline(
    cli: &Cli,
    config: &Config,
    sink: Box<dyn TransportSink>,
    policy: FlushPolicy,
) -> Result<()> {
    let source = build_source(cli, config)?;

    let (events_tx, events_rx) = crossbeam_channel::bounded::<CaptureEvent>(64);
    let reporter = std::thread::spawn(move || {
        for event in events_rx.iter() {
            match event {
                CaptureEvent::Flushed { bytes } => {
                    eprintln!("micstream: flushed {} bytes", bytes);
                }
                CaptureEvent::TransportError { message } => {
                    eprintln!("micstream: transport error: {}", message);
                }
                CaptureEvent::BufferDiscarded { message } => {
                    eprintln!("micstream: discarded audio: {}", message);
                }
                CaptureEvent::Stopped => {
                    eprintln!("micstream: capture stopped");
                }
            }
        }
    });

    eprintln!(
        "micstream: capturing {}ch @ {}Hz (Ctrl+C to stop)",
        config.audio.channels, config.audio.sample_rate
    );

    let pipeline = CapturePipeline::new(config.audio.sample_rate, policy);
    let (handle, mut join) = pipeline.start(source, sink, events_tx)?;

    tokio::select! {
        result = &mut join => {
            result??;
            finish_reporter(reporter);
            return Ok(());
        }
        _ = tokio::signal::ctrl_c() => {
            eprintln!();
            eprintln!("micstream: stopping...");
            handle.stop();
        }
    }

    join.await??;
    finish_reporter(reporter);
    Ok(())
}

fn finish_reporter(reporter: std::thread::JoinHandle<()>) {
    // Events sender is gone once the control loop returns, so this join
    // cannot hang.
    if reporter.join().is_err() {
        eprintln!("micstream: event reporter panicked");
    }
}

/// List available audio input devices.
#[cfg(feature = "cpal-audio")]
fn list_audio_devices() -> Result<()> {
    let devices = micstream::audio::capture::list_devices()?;

    if devices.is_empty() {
        eprintln!("No audio input devices found");
        std::process::exit(1);
    }

    println!("Available audio input devices:");
    for (idx, device) in devices.iter().enumerate() {
        println!("  [{}] {}", idx, device);
    }

    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn list_audio_devices() -> Result<()> {
    anyhow::bail!("built without the cpal-audio feature; no devices to list")
}
