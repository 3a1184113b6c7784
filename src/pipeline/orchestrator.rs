//! Orchestrator: the single consumer of the shared event queue.
//!
//! Runs a fixed-period tick on its own thread. Each tick drains a bounded
//! batch of events without ever blocking on the queue, then dispatches to
//! transcription, the Coach and the render sink. Everything downstream of
//! the drain is synchronous — a slow engine call stretches the tick but
//! never drops events, since the unbounded queue keeps absorbing producer
//! output. The one deliberate loss is the remote-partial throttle.

use crate::audio::codec;
use crate::audio::segmenter::SegmentKind;
use crate::coach::Coach;
use crate::defaults;
use crate::engine::transcriber::Transcriber;
use crate::pipeline::clock::{Clock, SystemClock};
use crate::pipeline::sink::{RenderEvent, RenderSink};
use crate::pipeline::types::{PipelineEvent, SourceId, SpeechEvent};
use crossbeam_channel::Receiver;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for the orchestration loop.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Tick period in milliseconds.
    pub tick_ms: u64,
    /// Maximum events drained per tick.
    pub batch_max: usize,
    /// Minimum spacing between processed remote partials, per source.
    pub partial_throttle_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            tick_ms: defaults::TICK_MS,
            batch_max: defaults::TICK_BATCH,
            partial_throttle_ms: defaults::PARTIAL_THROTTLE_MS,
        }
    }
}

/// Handle to a running orchestrator.
pub struct OrchestratorHandle {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl OrchestratorHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Signal shutdown and wait for the loop to finish its current tick.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for OrchestratorHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// The event consumer. Owns the Coach and all core mutable state; capture
/// threads only ever append to the queue.
pub struct Orchestrator {
    config: OrchestratorConfig,
    events: Receiver<PipelineEvent>,
    coach: Coach,
    transcriber: Arc<dyn Transcriber>,
    sink: Box<dyn RenderSink>,
    clock: Arc<dyn Clock>,
    sample_rate: u32,
    /// Last processed partial per source, for the throttle.
    last_partial: HashMap<SourceId, Instant>,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        events: Receiver<PipelineEvent>,
        coach: Coach,
        transcriber: Arc<dyn Transcriber>,
        sink: Box<dyn RenderSink>,
        sample_rate: u32,
    ) -> Self {
        Self {
            config,
            events,
            coach,
            transcriber,
            sink,
            clock: Arc::new(SystemClock),
            sample_rate,
            last_partial: HashMap::new(),
        }
    }

    /// Sets a custom clock (for deterministic throttle tests).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Spawn the tick loop on its own thread.
    pub fn start(self) -> OrchestratorHandle {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let mut orchestrator = self;

        let handle = thread::spawn(move || {
            let tick = Duration::from_millis(orchestrator.config.tick_ms);
            while flag.load(Ordering::SeqCst) {
                let started = Instant::now();
                orchestrator.drain_batch();
                if let Some(remaining) = tick.checked_sub(started.elapsed()) {
                    thread::sleep(remaining);
                }
            }
        });

        OrchestratorHandle {
            running,
            handle: Some(handle),
        }
    }

    /// Drain up to `batch_max` events; whatever is left waits for the next
    /// tick.
    fn drain_batch(&mut self) {
        for _ in 0..self.config.batch_max {
            match self.events.try_recv() {
                Ok(event) => self.dispatch(event),
                Err(_) => break,
            }
        }
    }

    fn dispatch(&mut self, event: PipelineEvent) {
        match event {
            PipelineEvent::StreamError { source, message } => {
                self.sink.render(RenderEvent::Status {
                    text: format!("audio error on {} stream: {message}", source.label()),
                });
            }
            PipelineEvent::Speech(event) => self.dispatch_speech(event),
        }
    }

    fn dispatch_speech(&mut self, event: SpeechEvent) {
        match (event.source, event.kind) {
            (SourceId::Remote, SegmentKind::Partial) => {
                if self.throttled(SourceId::Remote) {
                    return;
                }
                let text = self.transcribe(&event);
                if text.is_empty() {
                    return;
                }
                let suggestion = self.coach.draft(&text);
                let translation = self.coach.maybe_translate(&text);
                self.sink.render(RenderEvent::Remote {
                    phase: SegmentKind::Partial,
                    text,
                    translation,
                    suggestion,
                });
            }
            (SourceId::Remote, SegmentKind::Final) => {
                let text = self.transcribe(&event);
                if text.is_empty() {
                    return;
                }
                let suggestion = self.coach.finalize_remote(&text);
                let translation = self.coach.maybe_translate(&text);
                self.sink.render(RenderEvent::Remote {
                    phase: SegmentKind::Final,
                    text,
                    translation,
                    suggestion,
                });
            }
            (SourceId::Local, SegmentKind::Final) => {
                let text = self.transcribe(&event);
                if text.is_empty() {
                    return;
                }
                let evaluation = self.coach.evaluate_local(&text);
                self.sink.render(RenderEvent::Local { text, evaluation });
            }
            // Local partials are never dispatched; only completed local
            // utterances are worth evaluating.
            (SourceId::Local, SegmentKind::Partial) => {}
        }
    }

    /// Wall-clock partial throttle. Passing marks the source's timestamp.
    fn throttled(&mut self, source: SourceId) -> bool {
        let now = self.clock.now();
        let limit = Duration::from_millis(self.config.partial_throttle_ms);
        if let Some(last) = self.last_partial.get(&source)
            && now.duration_since(*last) < limit
        {
            return true;
        }
        self.last_partial.insert(source, now);
        false
    }

    fn transcribe(&self, event: &SpeechEvent) -> String {
        let samples = codec::bytes_to_f32(&event.pcm16);
        if samples.is_empty() {
            return String::new();
        }
        self.transcriber.transcribe(&samples, self.sample_rate)
    }
}
