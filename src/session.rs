//! Session wiring: two capture workers, the shared queue and the
//! orchestrator, assembled and torn down together.
//!
//! Reconfiguration is external and explicit — stop the session and start a
//! new one. The orchestrator never restarts failed workers on its own.

use crate::audio::segmenter::{EnergyClassifier, Segmenter, SegmenterConfig};
use crate::audio::source::AudioSource;
use crate::coach::{Coach, CoachConfig};
use crate::defaults;
use crate::engine::Engines;
use crate::pipeline::orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorHandle};
use crate::pipeline::sink::RenderSink;
use crate::pipeline::types::SourceId;
use crate::pipeline::worker::{self, WorkerHandle};
use crate::retrieval::DocumentStore;
use crossbeam_channel::unbounded;

/// Configuration for a capture/coaching session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub sample_rate: u32,
    /// Capture block period per worker.
    pub block_ms: u64,
    /// RMS threshold for the built-in energy speech classifier.
    pub speech_threshold: f32,
    pub segmenter: SegmenterConfig,
    pub orchestrator: OrchestratorConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            block_ms: defaults::BLOCK_MS,
            speech_threshold: defaults::SPEECH_THRESHOLD,
            segmenter: SegmenterConfig::default(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

/// A configured but not yet running session.
pub struct Session {
    config: SessionConfig,
    coach_config: CoachConfig,
}

impl Session {
    pub fn new(config: SessionConfig, coach_config: CoachConfig) -> Self {
        Self {
            config,
            coach_config,
        }
    }

    /// Start the session.
    ///
    /// # Arguments
    /// * `engines` - collaborator set (capabilities resolved up front)
    /// * `local` - microphone source for the coached user
    /// * `remote` - loopback source for the other party
    /// * `document_pages` - extracted reference document, possibly empty
    /// * `sink` - consumer of render events
    pub fn start(
        self,
        engines: Engines,
        local: Box<dyn AudioSource>,
        remote: Box<dyn AudioSource>,
        document_pages: &[(u32, String)],
        sink: Box<dyn RenderSink>,
    ) -> SessionHandle {
        let (event_tx, event_rx) = unbounded();

        let mut docstore = DocumentStore::new(engines.embedder.clone());
        if self.coach_config.enable_document {
            docstore.load(document_pages);
        }

        let coach = Coach::new(
            self.coach_config,
            engines.suggester.clone(),
            engines.embedder.clone(),
            engines.translator.clone(),
            docstore,
        );

        let orchestrator = Orchestrator::new(
            self.config.orchestrator,
            event_rx,
            coach,
            engines.transcriber.clone(),
            sink,
            self.config.sample_rate,
        )
        .start();

        // Each stream gets its own independent segmenter; no cross-stream
        // state.
        let mut workers = Vec::new();
        for (source, audio) in [(SourceId::Local, local), (SourceId::Remote, remote)] {
            let segmenter = Segmenter::new(
                self.config.segmenter,
                self.config.sample_rate,
                Box::new(EnergyClassifier::new(self.config.speech_threshold)),
            );
            workers.push(worker::spawn(
                source,
                audio,
                segmenter,
                event_tx.clone(),
                self.config.block_ms,
            ));
        }

        SessionHandle {
            workers,
            orchestrator,
        }
    }
}

/// Handle to a running session.
pub struct SessionHandle {
    workers: Vec<WorkerHandle>,
    orchestrator: OrchestratorHandle,
}

impl SessionHandle {
    /// True while the orchestration loop is alive.
    pub fn is_running(&self) -> bool {
        self.orchestrator.is_running()
    }

    /// Whether a specific capture worker is still alive.
    pub fn worker_running(&self, source: SourceId) -> bool {
        self.workers
            .iter()
            .find(|w| w.source() == source)
            .is_some_and(|w| w.is_running())
    }

    /// Stop one capture worker; the other worker and the orchestrator keep
    /// running, and events the worker already queued still get processed.
    pub fn stop_worker(&mut self, source: SourceId) {
        for worker in &mut self.workers {
            if worker.source() == source {
                worker.stop();
            }
        }
    }

    /// Stop everything: workers first, then the orchestrator after it had
    /// a chance to drain what they queued.
    pub fn stop(mut self) {
        for worker in &mut self.workers {
            worker.stop();
        }
        self.orchestrator.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::{FramePhase, MockAudioSource};
    use crate::engine::embedder::NoopEmbedder;
    use crate::engine::generator::{MockSuggestionEngine, Suggestion};
    use crate::engine::transcriber::MockTranscriber;
    use crate::engine::translator::NoopTranslator;
    use crate::pipeline::sink::{CollectorSink, RenderEvent};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn mock_engines(transcriber: MockTranscriber, suggester: MockSuggestionEngine) -> Engines {
        Engines {
            transcriber: Arc::new(transcriber),
            suggester: Arc::new(suggester),
            embedder: Arc::new(NoopEmbedder),
            translator: Arc::new(NoopTranslator),
        }
    }

    /// Loud speech then silence: one final segment per source.
    fn speaking_source() -> Box<dyn AudioSource> {
        Box::new(MockAudioSource::new().with_frame_sequence(vec![
            FramePhase {
                samples: vec![8000i16; 1600],
                count: 3,
            },
            FramePhase {
                samples: vec![0i16; 1600],
                count: 6,
            },
        ]))
    }

    fn silent_source() -> Box<dyn AudioSource> {
        Box::new(MockAudioSource::new().with_frame_sequence(vec![FramePhase {
            samples: vec![0i16; 1600],
            count: 9,
        }]))
    }

    fn fast_config() -> SessionConfig {
        SessionConfig {
            block_ms: 1,
            orchestrator: OrchestratorConfig {
                tick_ms: 5,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn wait_for<F: Fn() -> bool>(condition: F) {
        let deadline = Instant::now() + Duration::from_secs(3);
        while !condition() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_session_end_to_end_remote_final() {
        let engines = mock_engines(
            MockTranscriber::new().with_response("nice to meet you"),
            MockSuggestionEngine::new().with_suggestion(Suggestion {
                say_now: "say hello back".to_string(),
                ..Default::default()
            }),
        );

        let sink = CollectorSink::new();
        let rendered = sink.events();

        let handle = Session::new(fast_config(), CoachConfig::default()).start(
            engines,
            silent_source(),
            speaking_source(),
            &[],
            Box::new(sink),
        );

        wait_for(|| !rendered.lock().unwrap().is_empty());
        handle.stop();

        let rendered = rendered.lock().unwrap();
        assert!(!rendered.is_empty(), "no render events produced");
        match &rendered[0] {
            RenderEvent::Remote { text, suggestion, .. } => {
                assert_eq!(text, "nice to meet you");
                assert_eq!(suggestion.say_now, "say hello back");
            }
            other => panic!("expected remote render, got {other:?}"),
        }
    }

    #[test]
    fn test_session_worker_failure_is_isolated() {
        let engines = mock_engines(
            MockTranscriber::new().with_response("still here"),
            MockSuggestionEngine::new(),
        );

        let failing = Box::new(
            MockAudioSource::new()
                .with_read_failure()
                .with_error_message("loopback gone"),
        );

        let sink = CollectorSink::new();
        let rendered = sink.events();

        let handle = Session::new(fast_config(), CoachConfig::default()).start(
            engines,
            speaking_source(),
            failing,
            &[],
            Box::new(sink),
        );

        // Both the failure status and the surviving worker's utterance
        // should come through.
        wait_for(|| rendered.lock().unwrap().len() >= 2);
        assert!(handle.is_running());
        handle.stop();

        let rendered = rendered.lock().unwrap();
        let has_status = rendered.iter().any(|e| {
            matches!(e, RenderEvent::Status { text } if text.contains("loopback gone"))
        });
        let has_local = rendered
            .iter()
            .any(|e| matches!(e, RenderEvent::Local { .. }));
        assert!(has_status, "missing failure status: {rendered:?}");
        assert!(has_local, "missing local evaluation: {rendered:?}");
    }

    #[test]
    fn test_stop_worker_leaves_session_running() {
        let engines = mock_engines(MockTranscriber::new(), MockSuggestionEngine::new());

        let live = Box::new(MockAudioSource::new().as_live_source());
        let live2 = Box::new(MockAudioSource::new().as_live_source());

        let sink = CollectorSink::new();
        let mut handle = Session::new(fast_config(), CoachConfig::default()).start(
            engines,
            live,
            live2,
            &[],
            Box::new(sink),
        );

        assert!(handle.worker_running(SourceId::Local));
        handle.stop_worker(SourceId::Local);
        assert!(!handle.worker_running(SourceId::Local));
        assert!(handle.worker_running(SourceId::Remote));
        assert!(handle.is_running());

        handle.stop();
    }
}
