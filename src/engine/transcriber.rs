//! Speech-to-text collaborator contract.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

/// Trait for speech-to-text transcription.
///
/// The contract is tolerant: `transcribe` never fails, it returns an empty
/// string on any internal problem. Empty text suppresses all downstream
/// dispatch for the event that produced it.
pub trait Transcriber: Send + Sync {
    /// Transcribe mono float samples to text.
    ///
    /// # Arguments
    /// * `samples` - normalized mono samples in [-1.0, 1.0]
    /// * `sample_rate` - sample rate in Hz
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> String;

    /// Whether a working model is loaded. Resolved once at startup.
    fn is_available(&self) -> bool;
}

/// Transcriber used when no speech-to-text engine is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTranscriber;

impl Transcriber for NoopTranscriber {
    fn transcribe(&self, _samples: &[f32], _sample_rate: u32) -> String {
        String::new()
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Mock transcriber for testing.
#[derive(Debug, Default)]
pub struct MockTranscriber {
    /// Responses served in order; when exhausted, `fixed` is served.
    queued: Mutex<VecDeque<String>>,
    fixed: String,
    calls: AtomicU32,
}

impl MockTranscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve this response for every call (after any queued ones).
    pub fn with_response(mut self, response: &str) -> Self {
        self.fixed = response.to_string();
        self
    }

    /// Serve these responses first, in order.
    pub fn with_responses(self, responses: Vec<&str>) -> Self {
        {
            let mut queued = self.queued.lock().unwrap();
            queued.extend(responses.into_iter().map(String::from));
        }
        self
    }

    /// Number of transcribe calls so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _samples: &[f32], _sample_rate: u32) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut queued = self.queued.lock().unwrap();
        queued.pop_front().unwrap_or_else(|| self.fixed.clone())
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_is_unavailable_and_empty() {
        let transcriber = NoopTranscriber;
        assert!(!transcriber.is_available());
        assert_eq!(transcriber.transcribe(&[0.1, 0.2], 16000), "");
    }

    #[test]
    fn test_mock_serves_fixed_response() {
        let transcriber = MockTranscriber::new().with_response("hello world");
        assert_eq!(transcriber.transcribe(&[0.0; 100], 16000), "hello world");
        assert_eq!(transcriber.transcribe(&[0.0; 100], 16000), "hello world");
        assert_eq!(transcriber.calls(), 2);
    }

    #[test]
    fn test_mock_serves_queued_responses_first() {
        let transcriber = MockTranscriber::new()
            .with_responses(vec!["first", "second"])
            .with_response("rest");

        assert_eq!(transcriber.transcribe(&[], 16000), "first");
        assert_eq!(transcriber.transcribe(&[], 16000), "second");
        assert_eq!(transcriber.transcribe(&[], 16000), "rest");
    }

    #[test]
    fn test_trait_is_object_safe() {
        let transcriber: Box<dyn Transcriber> =
            Box::new(MockTranscriber::new().with_response("boxed"));
        assert!(transcriber.is_available());
        assert_eq!(transcriber.transcribe(&[0.0; 10], 16000), "boxed");
    }
}
