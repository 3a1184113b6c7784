//! Default configuration constants for wingman.
//!
//! Shared across configuration types so the same tuning values are not
//! duplicated. All of these are starting points, not fixed law — every one
//! is overridable through [`crate::config::Config`].

/// Default audio sample rate in Hz.
///
/// 16kHz is the standard for speech recognition and keeps per-frame work
/// cheap enough to run inline on the capture threads.
pub const SAMPLE_RATE: u32 = 16000;

/// VAD frame duration in milliseconds.
///
/// Capture blocks of any size are re-sliced into frames of this length
/// before classification. 20ms at 16kHz is 320 samples.
pub const FRAME_MS: u32 = 20;

/// Default RMS threshold for the energy speech classifier (0.0 to 1.0).
pub const SPEECH_THRESHOLD: f32 = 0.02;

/// Silence duration in milliseconds that closes an active speech segment.
pub const SILENCE_END_MS: u32 = 400;

/// Interval between `partial` segment emissions while speech continues.
pub const PARTIAL_EVERY_MS: u32 = 800;

/// Hard cap on a single speech segment in milliseconds.
///
/// A segment reaching this length is finalized even though speech
/// continues, preventing unbounded buffers during monologues.
pub const MAX_SEGMENT_MS: u32 = 7000;

/// Capture block duration in milliseconds.
///
/// Workers poll their source once per block; this is also the upper bound
/// on how long a stop request can go unobserved.
pub const BLOCK_MS: u64 = 100;

/// Orchestrator tick period in milliseconds.
pub const TICK_MS: u64 = 30;

/// Maximum events drained from the queue per orchestrator tick.
///
/// Bounds per-tick latency; events beyond the batch wait for the next tick
/// rather than blocking producers.
pub const TICK_BATCH: usize = 40;

/// Minimum wall-clock spacing between processed remote `partial` events.
///
/// Partials arriving faster than this are dropped — each is superseded by
/// the next partial or the final anyway.
pub const PARTIAL_THROTTLE_MS: u64 = 700;

/// Cosine-similarity cutoff below which a local utterance counts as a
/// topic shift away from the last remote utterance.
pub const TOPIC_SHIFT_THRESHOLD: f32 = 0.45;

/// Number of recent conversation turns included when building prompts.
pub const HISTORY_WINDOW: usize = 6;

/// Document chunk window size in characters.
pub const CHUNK_CHARS: usize = 1400;

/// Overlap between adjacent document chunks in characters.
pub const CHUNK_OVERLAP: usize = 200;

/// Number of document chunks retrieved per query.
pub const RETRIEVE_K: usize = 3;

/// Maximum characters of a retrieved chunk included in a prompt.
pub const SNIPPET_CHARS: usize = 600;

/// Token budget for a draft suggestion (remote partial).
pub const DRAFT_MAX_TOKENS: u32 = 70;

/// Token budget for a full suggestion (remote final).
pub const SUGGEST_MAX_TOKENS: u32 = 90;

/// Token budget for a bridge suggestion after a topic shift.
pub const BRIDGE_MAX_TOKENS: u32 = 60;

/// Default source language for remote-utterance translation.
pub const TRANSLATE_FROM: &str = "en";

/// Default target language for remote-utterance translation.
pub const TRANSLATE_TO: &str = "es";
