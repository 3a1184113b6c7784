//! Two concurrent capture workers share one queue: their event streams
//! interleave but each stream arrives complete and in order.

use crossbeam_channel::unbounded;
use wingman::audio::segmenter::{EnergyClassifier, SegmentEvent, Segmenter, SegmenterConfig};
use wingman::audio::source::{FramePhase, MockAudioSource};
use wingman::pipeline::types::{PipelineEvent, SourceId};
use wingman::pipeline::worker;

const SAMPLE_RATE: u32 = 16000;
const BLOCK: usize = 1600; // 100ms

fn segmenter() -> Segmenter {
    Segmenter::new(
        SegmenterConfig::default(),
        SAMPLE_RATE,
        Box::new(EnergyClassifier::default()),
    )
}

/// The blocks a phased script produces, in order.
fn blocks(phases: &[FramePhase]) -> Vec<Vec<i16>> {
    phases
        .iter()
        .flat_map(|phase| std::iter::repeat_n(phase.samples.clone(), phase.count as usize))
        .collect()
}

/// Events a fresh segmenter emits for the same block sequence.
fn expected_events(phases: &[FramePhase]) -> Vec<SegmentEvent> {
    let mut segmenter = segmenter();
    let mut events = Vec::new();
    for block in blocks(phases) {
        events.extend(segmenter.feed(&block));
    }
    events
}

fn loud(count: u32) -> FramePhase {
    FramePhase {
        samples: vec![8000i16; BLOCK],
        count,
    }
}

fn quiet(count: u32) -> FramePhase {
    FramePhase {
        samples: vec![0i16; BLOCK],
        count,
    }
}

#[test]
fn dual_workers_produce_complete_interleaved_streams() {
    // Local: two utterances. Remote: one long utterance with a partial.
    let local_phases = vec![loud(3), quiet(5), loud(2), quiet(5)];
    let remote_phases = vec![loud(9), quiet(5)];

    let expected_local = expected_events(&local_phases);
    let expected_remote = expected_events(&remote_phases);
    assert!(!expected_local.is_empty());
    assert!(!expected_remote.is_empty());

    let (tx, rx) = unbounded();

    let mut local_worker = worker::spawn(
        SourceId::Local,
        Box::new(MockAudioSource::new().with_frame_sequence(local_phases)),
        segmenter(),
        tx.clone(),
        1,
    );
    let mut remote_worker = worker::spawn(
        SourceId::Remote,
        Box::new(MockAudioSource::new().with_frame_sequence(remote_phases)),
        segmenter(),
        tx,
        1,
    );

    local_worker.join();
    remote_worker.join();

    let mut local_events = Vec::new();
    let mut remote_events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        match event {
            PipelineEvent::Speech(event) => {
                let segment = SegmentEvent {
                    kind: event.kind,
                    pcm16: event.pcm16,
                    duration_ms: event.duration_ms,
                };
                match event.source {
                    SourceId::Local => local_events.push(segment),
                    SourceId::Remote => remote_events.push(segment),
                }
            }
            PipelineEvent::StreamError { source, message } => {
                panic!("unexpected stream error on {}: {message}", source.label());
            }
        }
    }

    // Per-source streams match what each segmenter would produce alone,
    // so the drained total is exactly the sum of the two.
    assert_eq!(local_events, expected_local);
    assert_eq!(remote_events, expected_remote);
}

#[test]
fn stopping_one_worker_does_not_disturb_the_other() {
    let remote_phases = vec![loud(3), quiet(5)];
    let expected_remote = expected_events(&remote_phases);

    let (tx, rx) = unbounded();

    let mut local_worker = worker::spawn(
        SourceId::Local,
        Box::new(MockAudioSource::new().as_live_source()),
        segmenter(),
        tx.clone(),
        1,
    );
    let mut remote_worker = worker::spawn(
        SourceId::Remote,
        Box::new(MockAudioSource::new().with_frame_sequence(remote_phases)),
        segmenter(),
        tx,
        1,
    );

    local_worker.stop();
    remote_worker.join();

    let mut remote_events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let PipelineEvent::Speech(event) = event {
            assert_eq!(event.source, SourceId::Remote);
            remote_events.push(SegmentEvent {
                kind: event.kind,
                pcm16: event.pcm16,
                duration_ms: event.duration_ms,
            });
        }
    }

    assert_eq!(remote_events, expected_remote);
}
