//! Line Relay Runtime
//!
//! This crate runs the line relay pipeline:
//! - `PipelineBuilder` / `PipelineHandle`: start and control the stage threads
//! - `StageWorker`: per-stage receive, transform, trace and forward loop
//! - `DispatchLoop`: operator input and the reconfiguration state machine
//! - `InterruptBridge`: asynchronous entry into reconfiguration
//! - `Console`: serialized output shared by every thread

pub mod console;
pub mod dispatch;
pub mod events;
pub mod interrupt;
pub mod pipeline;
pub mod stage;

pub use console::{CapturedOutput, Console};
pub use dispatch::{DispatchLoop, DispatchOutcome, DispatchPhase, DispatchState, NORMAL_PROMPT};
pub use events::{
    create_event_channel, EventReceiver, EventSender, PipelineEvent, StageStats,
    StageStatsSnapshot,
};
pub use interrupt::{InterruptBridge, InterruptOutcome};
pub use pipeline::{PipelineBuilder, PipelineHandle};
pub use stage::{StageConfig, StageInbox, StageWorker};

// Re-export core types for convenience
pub use linerelay_core::{
    Line, Mailbox, Mode, ModeId, PipelineConfig, PipelineError, PipelineResult, Transform,
    TransformError, TransformRegistry, STAGE_COUNT,
};
