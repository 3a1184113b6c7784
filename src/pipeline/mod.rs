//! Dual-stream pipeline: capture workers, event queue and the
//! orchestration loop.
//!
//! Workers run one thread per source and only ever append to the shared
//! unbounded queue; the orchestrator is its single consumer and owns all
//! core mutable state.

pub mod clock;
pub mod orchestrator;
pub mod sink;
pub mod types;
pub mod worker;

pub use clock::{Clock, MockClock, SystemClock};
pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorHandle};
pub use sink::{CollectorSink, RenderEvent, RenderSink, StdoutSink};
pub use types::{PipelineEvent, SourceId, SpeechEvent};
pub use worker::WorkerHandle;
