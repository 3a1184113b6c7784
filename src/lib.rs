//! wingman - real-time dual-channel conversation coaching
//!
//! Listens to a local microphone and a remote loopback stream at the same
//! time, segments speech with a deterministic VAD state machine, and drives
//! a conversation coach that suggests what to say and evaluates what was
//! said. The intelligence engines (speech-to-text, language model,
//! embeddings, translation, document extraction) are external
//! collaborators consumed through tolerant trait contracts.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod audio;
#[cfg(feature = "cli")]
pub mod cli;
pub mod coach;
pub mod config;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod retrieval;
pub mod session;

// Core traits (capture → segment → orchestrate → render)
pub use audio::segmenter::{SegmentKind, Segmenter, SegmenterConfig, SpeechClassifier};
pub use audio::source::AudioSource;
pub use engine::{Embedder, Engines, SuggestionEngine, Transcriber, Translator};
pub use pipeline::sink::{RenderEvent, RenderSink};

// Session assembly
pub use session::{Session, SessionConfig, SessionHandle};

// Conversation state
pub use coach::{Coach, CoachConfig, EvalStatus, EvaluationResult};
pub use engine::generator::Suggestion;
pub use retrieval::{DocumentExtractor, DocumentStore, RetrievalHit};

// Error handling
pub use error::{Result, WingmanError};

// Config
pub use config::Config;
