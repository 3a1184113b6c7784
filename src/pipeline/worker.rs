//! Capture worker: one thread per audio source.
//!
//! Pulls ~100ms blocks from its source, feeds the stream's own segmenter
//! and pushes every resulting event onto the shared queue. Workers are
//! fully independent; the queue is their only coordination point.

use crate::audio::segmenter::Segmenter;
use crate::audio::source::AudioSource;
use crate::pipeline::types::{PipelineEvent, SourceId, SpeechEvent};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Handle to a running capture worker.
pub struct WorkerHandle {
    source: SourceId,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn source(&self) -> SourceId {
        self.source
    }

    /// True while the worker thread is alive and not stopping.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Request a stop and wait for the thread.
    ///
    /// The flag is checked once per block, so this returns within roughly
    /// one block period.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Wait for the worker to finish on its own (finite source or failure).
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn a capture worker for one source.
///
/// On any stream failure the worker sends a single error event and
/// terminates itself; other workers and the orchestrator are unaffected.
/// Events already queued when a worker stops still get processed.
pub fn spawn(
    source: SourceId,
    mut audio: Box<dyn AudioSource>,
    mut segmenter: Segmenter,
    events: Sender<PipelineEvent>,
    block_ms: u64,
) -> WorkerHandle {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);

    let handle = thread::spawn(move || {
        if let Err(e) = audio.start() {
            let _ = events.send(PipelineEvent::StreamError {
                source,
                message: e.to_string(),
            });
            flag.store(false, Ordering::SeqCst);
            return;
        }

        let block = Duration::from_millis(block_ms);

        while flag.load(Ordering::SeqCst) {
            match audio.read_samples() {
                Ok(samples) => {
                    if samples.is_empty() {
                        if audio.is_finite() {
                            break;
                        }
                        // Live source warming up; keep polling.
                        thread::sleep(block);
                        continue;
                    }

                    let mut disconnected = false;
                    for segment in segmenter.feed(&samples) {
                        let event = PipelineEvent::Speech(SpeechEvent {
                            source,
                            kind: segment.kind,
                            pcm16: segment.pcm16,
                            duration_ms: segment.duration_ms,
                            received: Instant::now(),
                        });
                        if events.send(event).is_err() {
                            // Consumer gone; nothing left to do.
                            disconnected = true;
                            break;
                        }
                    }
                    if disconnected {
                        break;
                    }

                    thread::sleep(block);
                }
                Err(e) => {
                    let _ = events.send(PipelineEvent::StreamError {
                        source,
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }

        if let Err(e) = audio.stop() {
            eprintln!("wingman: failed to stop {} capture: {e}", source.label());
        }
        flag.store(false, Ordering::SeqCst);
    });

    WorkerHandle {
        source,
        running,
        handle: Some(handle),
    }
}
