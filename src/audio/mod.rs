//! Audio capture, PCM conversion and VAD segmentation.

#[cfg(feature = "cpal-audio")]
pub mod capture;
pub mod codec;
pub mod segmenter;
pub mod source;
pub mod wav;

pub use segmenter::{
    EnergyClassifier, MockClassifier, SegmentEvent, SegmentKind, Segmenter, SegmenterConfig,
    SpeechClassifier,
};
pub use source::{AudioSource, FramePhase, MockAudioSource};
pub use wav::WavAudioSource;
