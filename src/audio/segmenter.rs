//! VAD segmenter: turns a continuous sample stream into partial and final
//! speech segments.
//!
//! Audio arrives in arbitrary-length chunks and is re-sliced into
//! fixed-duration frames through an internal byte buffer. Each frame is
//! classified speech/non-speech by a [`SpeechClassifier`]; all timing is
//! frame-count based, so an identical frame/classification sequence always
//! reproduces the identical event sequence.

use crate::audio::codec;
use crate::defaults;
use crate::error::Result;

/// Classifies a single fixed-duration frame as speech or non-speech.
///
/// A classification failure is treated as non-speech by the segmenter and
/// never propagated upward.
pub trait SpeechClassifier: Send {
    fn classify(&mut self, frame: &[i16], sample_rate: u32) -> Result<bool>;
}

/// RMS-energy speech classifier.
///
/// Frames whose normalized RMS exceeds the threshold count as speech.
#[derive(Debug, Clone, Copy)]
pub struct EnergyClassifier {
    threshold: f32,
}

impl EnergyClassifier {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl Default for EnergyClassifier {
    fn default() -> Self {
        Self::new(defaults::SPEECH_THRESHOLD)
    }
}

impl SpeechClassifier for EnergyClassifier {
    fn classify(&mut self, frame: &[i16], _sample_rate: u32) -> Result<bool> {
        Ok(codec::rms(frame) > self.threshold)
    }
}

/// Scripted classifier for tests: replays a fixed decision per frame.
///
/// `None` entries simulate a classifier failure. Once the script is
/// exhausted every frame is classified as non-speech.
pub struct MockClassifier {
    script: std::collections::VecDeque<Option<bool>>,
}

impl MockClassifier {
    pub fn new(script: Vec<Option<bool>>) -> Self {
        Self {
            script: script.into(),
        }
    }

    /// Convenience constructor from plain speech/non-speech decisions.
    pub fn from_decisions(decisions: Vec<bool>) -> Self {
        Self::new(decisions.into_iter().map(Some).collect())
    }
}

impl SpeechClassifier for MockClassifier {
    fn classify(&mut self, _frame: &[i16], _sample_rate: u32) -> Result<bool> {
        match self.script.pop_front() {
            Some(Some(decision)) => Ok(decision),
            Some(None) => Err(crate::error::WingmanError::Classification {
                message: "scripted failure".to_string(),
            }),
            None => Ok(false),
        }
    }
}

/// Kind of segment event emitted by the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// In-progress segment, emitted for low-latency feedback.
    Partial,
    /// Completed, boundary-closed segment.
    Final,
}

/// A speech segment emitted by a segmenter transition.
///
/// The payload is little-endian 16-bit PCM containing only speech frames;
/// its length is always `duration_ms * sample_rate * 2 / 1000` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentEvent {
    pub kind: SegmentKind,
    pub pcm16: Vec<u8>,
    pub duration_ms: u32,
}

/// Configuration for the segmenter state machine.
#[derive(Debug, Clone, Copy)]
pub struct SegmenterConfig {
    /// Frame duration in milliseconds.
    pub frame_ms: u32,
    /// Silence run length that finalizes an active segment.
    pub silence_end_ms: u32,
    /// Spacing between partial emissions while a segment stays active.
    pub partial_every_ms: u32,
    /// Hard cap on segment length; reaching it forces a final.
    pub max_segment_ms: u32,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            frame_ms: defaults::FRAME_MS,
            silence_end_ms: defaults::SILENCE_END_MS,
            partial_every_ms: defaults::PARTIAL_EVERY_MS,
            max_segment_ms: defaults::MAX_SEGMENT_MS,
        }
    }
}

/// Per-stream VAD segmenter.
///
/// Two states: idle and active, with at most one in-flight segment. Each
/// audio stream owns its own instance; there is no cross-stream state.
pub struct Segmenter {
    config: SegmenterConfig,
    sample_rate: u32,
    classifier: Box<dyn SpeechClassifier>,
    /// Bytes not yet forming a whole frame.
    buf: Vec<u8>,
    active: bool,
    segment: Vec<u8>,
    silence_ms: u32,
    partial_ms: u32,
    segment_ms: u32,
}

impl Segmenter {
    pub fn new(
        config: SegmenterConfig,
        sample_rate: u32,
        classifier: Box<dyn SpeechClassifier>,
    ) -> Self {
        Self {
            config,
            sample_rate,
            classifier,
            buf: Vec::new(),
            active: false,
            segment: Vec::new(),
            silence_ms: 0,
            partial_ms: 0,
            segment_ms: 0,
        }
    }

    /// Bytes per frame: `sample_rate * frame_ms / 1000` samples, 2 bytes each.
    fn frame_bytes(&self) -> usize {
        (self.sample_rate * self.config.frame_ms / 1000) as usize * 2
    }

    /// Returns true while a segment is in flight.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Feeds a chunk of samples, returning every event it triggered.
    ///
    /// Chunks may be any length; leftover bytes that do not fill a whole
    /// frame are carried over to the next call.
    pub fn feed(&mut self, samples: &[i16]) -> Vec<SegmentEvent> {
        let mut events = Vec::new();
        self.buf.extend_from_slice(&codec::i16_to_bytes(samples));

        let frame_bytes = self.frame_bytes();
        while self.buf.len() >= frame_bytes {
            let frame: Vec<u8> = self.buf.drain(..frame_bytes).collect();
            let pcm = codec::bytes_to_i16(&frame);
            // Classification failure degrades to non-speech.
            let is_speech = self
                .classifier
                .classify(&pcm, self.sample_rate)
                .unwrap_or(false);

            if is_speech {
                self.speech_frame(frame, &mut events);
            } else {
                self.silence_frame(&mut events);
            }
        }

        events
    }

    fn speech_frame(&mut self, frame: Vec<u8>, events: &mut Vec<SegmentEvent>) {
        if !self.active {
            self.active = true;
            self.segment.clear();
            self.silence_ms = 0;
            self.partial_ms = 0;
            self.segment_ms = 0;
        }

        self.segment.extend_from_slice(&frame);
        self.segment_ms += self.config.frame_ms;
        self.silence_ms = 0;

        self.partial_ms += self.config.frame_ms;
        if self.partial_ms >= self.config.partial_every_ms {
            self.partial_ms = 0;
            events.push(SegmentEvent {
                kind: SegmentKind::Partial,
                pcm16: self.segment.clone(),
                duration_ms: self.segment_ms,
            });
        }

        if self.segment_ms >= self.config.max_segment_ms {
            events.push(SegmentEvent {
                kind: SegmentKind::Final,
                pcm16: std::mem::take(&mut self.segment),
                duration_ms: self.segment_ms,
            });
            self.active = false;
        }
    }

    fn silence_frame(&mut self, events: &mut Vec<SegmentEvent>) {
        if !self.active {
            return;
        }

        self.silence_ms += self.config.frame_ms;
        if self.silence_ms >= self.config.silence_end_ms {
            events.push(SegmentEvent {
                kind: SegmentKind::Final,
                pcm16: std::mem::take(&mut self.segment),
                duration_ms: self.segment_ms,
            });
            self.active = false;
        }
    }
}
