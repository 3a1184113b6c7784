//! Data types flowing through the pipeline.

use crate::audio::segmenter::SegmentKind;
use std::time::Instant;

/// Identity of an audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    /// The coached user's microphone.
    Local,
    /// The remote party's loopback audio.
    Remote,
}

impl SourceId {
    pub fn label(&self) -> &'static str {
        match self {
            SourceId::Local => "local",
            SourceId::Remote => "remote",
        }
    }
}

/// A speech segment tagged with its source, queued for the orchestrator.
///
/// Consumed exactly once, then discarded.
#[derive(Debug, Clone)]
pub struct SpeechEvent {
    pub source: SourceId,
    pub kind: SegmentKind,
    /// Little-endian 16-bit PCM payload (speech frames only).
    pub pcm16: Vec<u8>,
    /// Cumulative speech duration in the payload.
    pub duration_ms: u32,
    /// Monotonic timestamp of when the worker produced the event.
    pub received: Instant,
}

/// Everything a capture worker can put on the shared queue.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Speech(SpeechEvent),
    /// Terminal stream failure of one worker; emitted once.
    StreamError { source: SourceId, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_labels() {
        assert_eq!(SourceId::Local.label(), "local");
        assert_eq!(SourceId::Remote.label(), "remote");
    }

    #[test]
    fn test_speech_event_construction() {
        let event = SpeechEvent {
            source: SourceId::Remote,
            kind: SegmentKind::Partial,
            pcm16: vec![0u8; 64],
            duration_ms: 2,
            received: Instant::now(),
        };
        assert_eq!(event.source, SourceId::Remote);
        assert_eq!(event.kind, SegmentKind::Partial);
        assert_eq!(event.pcm16.len(), 64);
    }
}
