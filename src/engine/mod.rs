//! Collaborator contracts for the intelligence engines.
//!
//! The core never talks to a model directly; it consumes these traits.
//! Every contract is tolerant — failure surfaces as an empty result, not
//! an error — and exposes an `is_available()` capability predicate that is
//! resolved once at startup, so call paths branch on capability instead of
//! probing.

pub mod embedder;
pub mod generator;
pub mod transcriber;
pub mod translator;

pub use embedder::{Embedder, MockEmbedder, NoopEmbedder, dot};
pub use generator::{
    MockSuggestionEngine, NoopSuggestionEngine, Suggestion, SuggestionEngine, suggestion_from_json,
};
pub use transcriber::{MockTranscriber, NoopTranscriber, Transcriber};
pub use translator::{MockTranslator, NoopTranslator, Translator};

use std::sync::Arc;

/// The full set of collaborators a session runs with.
#[derive(Clone)]
pub struct Engines {
    pub transcriber: Arc<dyn Transcriber>,
    pub suggester: Arc<dyn SuggestionEngine>,
    pub embedder: Arc<dyn Embedder>,
    pub translator: Arc<dyn Translator>,
}

impl Engines {
    /// Every capability absent: transcription yields empty text, suggestions
    /// are empty, no embeddings, no translation.
    pub fn noop() -> Self {
        Self {
            transcriber: Arc::new(NoopTranscriber),
            suggester: Arc::new(NoopSuggestionEngine),
            embedder: Arc::new(NoopEmbedder),
            translator: Arc::new(NoopTranslator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_engines_have_no_capabilities() {
        let engines = Engines::noop();
        assert!(!engines.transcriber.is_available());
        assert!(!engines.suggester.is_available());
        assert!(!engines.embedder.is_available());
        assert!(!engines.translator.is_available());
    }
}
