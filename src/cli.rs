//! Command-line interface.
//!
//! Developer-facing surface: device discovery and a segmentation harness
//! that replays a WAV through a capture worker and prints the events.

use crate::audio::segmenter::{EnergyClassifier, Segmenter};
use crate::audio::wav::WavAudioSource;
use crate::config::Config;
use crate::pipeline::types::{PipelineEvent, SourceId};
use crate::pipeline::worker;
use anyhow::Context;
use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "wingman", version, about = "Real-time conversation coaching pipeline")]
pub struct Cli {
    /// Configuration file (default: ~/.config/wingman/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List capture devices (microphones and loopback monitors)
    Devices,
    /// Replay a WAV file through the segmenter and print segment events
    Segments {
        /// WAV file to replay
        wav: PathBuf,
        /// Tag events as the remote stream instead of the local one
        #[arg(long)]
        remote: bool,
    },
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_path()?,
    };
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?
        .with_env_overrides();

    match cli.command {
        Command::Devices => devices(),
        Command::Segments { wav, remote } => segments(&config, &wav, remote),
    }
}

#[cfg(feature = "cpal-audio")]
fn devices() -> anyhow::Result<()> {
    for name in crate::audio::capture::list_devices()? {
        println!("{name}");
    }
    Ok(())
}

#[cfg(not(feature = "cpal-audio"))]
fn devices() -> anyhow::Result<()> {
    anyhow::bail!("this build has no live audio support; rebuild with --features cpal-audio")
}

fn segments(config: &Config, wav: &PathBuf, remote: bool) -> anyhow::Result<()> {
    let source_id = if remote {
        SourceId::Remote
    } else {
        SourceId::Local
    };

    let source = WavAudioSource::from_path(wav, config.audio.sample_rate)
        .with_context(|| format!("reading {}", wav.display()))?;

    let segmenter = Segmenter::new(
        config.segmenter_config(),
        config.audio.sample_rate,
        Box::new(EnergyClassifier::new(config.segmenter.speech_threshold)),
    );

    let (tx, rx) = unbounded();
    let mut handle = worker::spawn(
        source_id,
        Box::new(source),
        segmenter,
        tx,
        config.audio.block_ms,
    );

    // The worker ends on its own when the file runs out; keep printing
    // until the channel disconnects.
    loop {
        match rx.recv_timeout(Duration::from_millis(200)) {
            Ok(PipelineEvent::Speech(event)) => {
                println!(
                    "[{}] {:?} {}ms ({} bytes)",
                    event.source.label(),
                    event.kind,
                    event.duration_ms,
                    event.pcm16.len(),
                );
            }
            Ok(PipelineEvent::StreamError { source, message }) => {
                eprintln!("wingman: {} stream error: {message}", source.label());
                break;
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                if !handle.is_running() {
                    break;
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    handle.join();
    Ok(())
}
