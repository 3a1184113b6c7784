//! Audio source abstraction.
//!
//! Capture workers poll an [`AudioSource`] for blocks of 16-bit mono
//! samples. Implementations cover live devices ([`crate::audio::capture`]),
//! WAV replay ([`crate::audio::wav`]) and the scripted mock below.

use crate::error::{Result, WingmanError};

/// Trait for audio source devices.
///
/// This trait allows swapping implementations (real device, WAV replay,
/// mock).
pub trait AudioSource: Send {
    /// Start capturing audio from the source.
    fn start(&mut self) -> Result<()>;

    /// Stop capturing audio from the source.
    fn stop(&mut self) -> Result<()>;

    /// Read whatever samples have accumulated since the last read.
    ///
    /// An empty read from a finite source means exhaustion; from a live
    /// source it just means no data yet.
    fn read_samples(&mut self) -> Result<Vec<i16>>;

    /// Whether the source runs out (file/pipe) or is live (microphone).
    fn is_finite(&self) -> bool;
}

/// One phase of a scripted mock source: `count` reads each returning a
/// copy of `samples`.
#[derive(Debug, Clone)]
pub struct FramePhase {
    pub samples: Vec<i16>,
    pub count: u32,
}

/// Mock audio source for testing.
///
/// Plays through its frame phases in order, then returns empty reads.
#[derive(Debug, Clone, Default)]
pub struct MockAudioSource {
    phases: Vec<FramePhase>,
    phase_index: usize,
    reads_in_phase: u32,
    live: bool,
    started: bool,
    fail_start: bool,
    fail_read: bool,
    error_message: Option<String>,
}

impl MockAudioSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the reads this source will serve.
    pub fn with_frame_sequence(mut self, phases: Vec<FramePhase>) -> Self {
        self.phases = phases;
        self
    }

    /// Mark the source as live: empty reads mean "no data yet" instead of
    /// exhaustion.
    pub fn as_live_source(mut self) -> Self {
        self.live = true;
        self
    }

    /// Configure the mock to fail on start.
    pub fn with_start_failure(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Configure the mock to fail on every read.
    pub fn with_read_failure(mut self) -> Self {
        self.fail_read = true;
        self
    }

    /// Configure the error message used by injected failures.
    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = Some(message.to_string());
        self
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    fn error(&self) -> WingmanError {
        WingmanError::AudioCapture {
            message: self
                .error_message
                .clone()
                .unwrap_or_else(|| "mock audio error".to_string()),
        }
    }
}

impl AudioSource for MockAudioSource {
    fn start(&mut self) -> Result<()> {
        if self.fail_start {
            return Err(self.error());
        }
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.started = false;
        Ok(())
    }

    fn read_samples(&mut self) -> Result<Vec<i16>> {
        if self.fail_read {
            return Err(self.error());
        }

        while let Some(phase) = self.phases.get(self.phase_index) {
            if self.reads_in_phase < phase.count {
                self.reads_in_phase += 1;
                return Ok(phase.samples.clone());
            }
            self.phase_index += 1;
            self.reads_in_phase = 0;
        }

        Ok(Vec::new())
    }

    fn is_finite(&self) -> bool {
        !self.live
    }
}
