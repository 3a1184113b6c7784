//! Render events and the sink that consumes them.
//!
//! The pipeline's produced interface is a stream of [`RenderEvent`]s; what
//! happens to them (overlay, terminal, test collection) is the sink's
//! business.

use crate::audio::segmenter::SegmentKind;
use crate::coach::{EvalStatus, EvaluationResult};
use crate::engine::generator::Suggestion;
use std::sync::{Arc, Mutex};

/// One unit of rendered output.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// Status or diagnostic message (e.g. a worker failure).
    Status { text: String },
    /// A remote utterance with its coaching payload.
    Remote {
        phase: SegmentKind,
        text: String,
        /// Empty when translation is disabled or unavailable.
        translation: String,
        suggestion: Suggestion,
    },
    /// A local utterance with its evaluation.
    Local {
        text: String,
        evaluation: EvaluationResult,
    },
}

/// Consumer of render events.
pub trait RenderSink: Send {
    fn render(&mut self, event: RenderEvent);
}

/// Sink that prints render events to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl RenderSink for StdoutSink {
    fn render(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::Status { text } => println!("-- {text}"),
            RenderEvent::Remote {
                phase,
                text,
                translation,
                suggestion,
            } => {
                let marker = match phase {
                    SegmentKind::Partial => "…",
                    SegmentKind::Final => " ",
                };
                println!("THEM{marker}: {text}");
                if !translation.is_empty() {
                    println!("  [{translation}]");
                }
                if let Some(bridge) = &suggestion.bridge_now {
                    println!("  BRIDGE: {bridge}");
                }
                if !suggestion.say_now.is_empty() {
                    println!("  SAY NOW: {}", suggestion.say_now);
                }
            }
            RenderEvent::Local { text, evaluation } => {
                println!("YOU : {text}");
                match evaluation.status {
                    EvalStatus::Ok => println!("  OK"),
                    EvalStatus::TopicShift => println!("  ! topic shift"),
                    EvalStatus::MissingSlots => println!("  ! missing slots"),
                }
                for note in &evaluation.notes {
                    println!("  {note}");
                }
                if let Some(bridge) = &evaluation.suggestion.bridge_now {
                    println!("  BRIDGE: {bridge}");
                }
                if !evaluation.suggestion.say_now.is_empty() {
                    println!("  SAY NOW: {}", evaluation.suggestion.say_now);
                }
            }
        }
    }
}

/// Sink that collects events for inspection in tests.
#[derive(Debug, Clone, Default)]
pub struct CollectorSink {
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the collected events; clone before boxing the sink.
    pub fn events(&self) -> Arc<Mutex<Vec<RenderEvent>>> {
        Arc::clone(&self.events)
    }
}

impl RenderSink for CollectorSink {
    fn render(&mut self, event: RenderEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
