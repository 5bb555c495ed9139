//! Pipeline events and per-stage statistics

use std::sync::atomic::{AtomicU64, Ordering};

use linerelay_core::{Line, ModeId, TransformError};
use tokio::sync::mpsc;

/// Observable pipeline activity, mirrored from the console trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// A stage printed its trace line (stage 0 is the dispatch loop)
    Traced { stage: usize, text: Line },
    /// A stage was switched to a new mode
    Reconfigured {
        stage: usize,
        mode: ModeId,
        name: String,
    },
    /// A transform failed; the line was forwarded unchanged
    TransformFailed {
        stage: usize,
        mode: ModeId,
        error: TransformError,
    },
}

pub type EventSender = mpsc::UnboundedSender<PipelineEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<PipelineEvent>;

/// Create the event tap channel
pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Optional event tap; a missing or dropped receiver is not an error
#[derive(Debug, Clone, Default)]
pub(crate) struct EventTap {
    sender: Option<EventSender>,
}

impl EventTap {
    pub(crate) fn new(sender: Option<EventSender>) -> Self {
        Self { sender }
    }

    pub(crate) fn emit(&self, event: PipelineEvent) {
        if let Some(sender) = &self.sender {
            // Receiver may have gone away during shutdown
            let _ = sender.send(event);
        }
    }
}

// ----------------------------------------------------------------------------
// Stage Statistics
// ----------------------------------------------------------------------------

/// Counters updated by a stage thread
#[derive(Debug, Default)]
pub struct StageStats {
    lines_processed: AtomicU64,
    transform_failures: AtomicU64,
}

/// Point-in-time copy of `StageStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageStatsSnapshot {
    pub lines_processed: u64,
    pub transform_failures: u64,
}

impl StageStats {
    pub(crate) fn record_line(&self) {
        self.lines_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.transform_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StageStatsSnapshot {
        StageStatsSnapshot {
            lines_processed: self.lines_processed.load(Ordering::Relaxed),
            transform_failures: self.transform_failures.load(Ordering::Relaxed),
        }
    }
}
