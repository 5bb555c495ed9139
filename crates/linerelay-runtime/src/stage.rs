//! Worker Stage
//!
//! Each stage owns one mailbox as its inbox and runs on its own OS thread:
//! receive a line, apply the configured transform, print a trace line and
//! forward the result to the next stage if there is one.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use linerelay_core::{Line, Mailbox, ModeId, PipelineError, PipelineResult, Transform};
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::events::{EventTap, PipelineEvent, StageStats};

// ----------------------------------------------------------------------------
// Stage Configuration
// ----------------------------------------------------------------------------

/// Mode of a stage and the transform derived from it.
///
/// Stored inside the stage's mailbox so both fields change in one critical
/// section and are read together with the next line.
#[derive(Debug, Clone)]
pub struct StageConfig {
    pub mode: ModeId,
    pub transform: Arc<dyn Transform>,
}

impl StageConfig {
    pub fn new(mode: ModeId, transform: Arc<dyn Transform>) -> Self {
        Self { mode, transform }
    }

    pub fn name(&self) -> &str {
        self.transform.name()
    }
}

/// Inbox type shared between a stage and its producer
pub type StageInbox = Mailbox<StageConfig>;

// ----------------------------------------------------------------------------
// Stage Worker
// ----------------------------------------------------------------------------

/// One pipeline stage, moved onto its own thread by `spawn`
pub struct StageWorker {
    number: usize,
    inbox: Arc<StageInbox>,
    downstream: Option<Arc<StageInbox>>,
    console: Console,
    events: EventTap,
    stats: Arc<StageStats>,
}

impl StageWorker {
    pub(crate) fn new(
        number: usize,
        inbox: Arc<StageInbox>,
        downstream: Option<Arc<StageInbox>>,
        console: Console,
        events: EventTap,
        stats: Arc<StageStats>,
    ) -> Self {
        Self {
            number,
            inbox,
            downstream,
            console,
            events,
            stats,
        }
    }

    /// Start the stage on a named thread
    pub(crate) fn spawn(self) -> PipelineResult<JoinHandle<()>> {
        let number = self.number;
        thread::Builder::new()
            .name(format!("stage-{}", number))
            .spawn(move || self.run())
            .map_err(|source| PipelineError::Spawn {
                stage: number,
                source,
            })
    }

    /// Process lines until the inbox is closed and drained
    pub fn run(self) {
        info!("Stage {} started", self.number);

        while let Some((line, config)) = self.inbox.receive() {
            self.process(line, &config);
        }

        // Propagate shutdown once everything upstream has been forwarded
        if let Some(downstream) = &self.downstream {
            downstream.close();
        }

        info!("Stage {} stopped", self.number);
    }

    fn process(&self, mut line: Line, config: &StageConfig) {
        debug!(
            "Stage {} applying {} to {} bytes",
            self.number,
            config.name(),
            line.len()
        );

        let mut rewritten = line.as_bytes().to_vec();
        match config.transform.apply(&mut rewritten) {
            Ok(()) => line = Line::new(rewritten),
            Err(error) => {
                warn!(
                    "Stage {} transform {} failed, forwarding input unchanged: {}",
                    self.number,
                    config.name(),
                    error
                );
                self.stats.record_failure();
                self.events.emit(PipelineEvent::TransformFailed {
                    stage: self.number,
                    mode: config.mode,
                    error,
                });
            }
        }

        if let Err(e) = self.console.trace(self.number, &line) {
            warn!("Stage {} failed to write trace: {}", self.number, e);
        }
        self.stats.record_line();
        self.events.emit(PipelineEvent::Traced {
            stage: self.number,
            text: line.clone(),
        });

        if let Some(downstream) = &self.downstream {
            if !downstream.send(&line) {
                warn!("Stage {} downstream closed, dropping line", self.number);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linerelay_core::{Mode, TransformError};

    #[derive(Debug)]
    struct Rejecting;

    impl Transform for Rejecting {
        fn name(&self) -> &str {
            "Rejecting"
        }

        fn apply(&self, _text: &mut Vec<u8>) -> Result<(), TransformError> {
            Err(TransformError::Rejected {
                name: "Rejecting".to_string(),
                reason: "always".to_string(),
            })
        }
    }

    fn worker(
        config: StageConfig,
        downstream: Option<Arc<StageInbox>>,
    ) -> (StageWorker, Arc<StageInbox>, crate::console::CapturedOutput, Arc<StageStats>) {
        let inbox = Arc::new(StageInbox::new(config));
        let (console, output) = Console::capture();
        let stats = Arc::new(StageStats::default());
        let worker = StageWorker::new(
            1,
            inbox.clone(),
            downstream,
            console,
            EventTap::default(),
            stats.clone(),
        );
        (worker, inbox, output, stats)
    }

    #[test]
    fn test_stage_transforms_and_forwards() {
        let downstream = Arc::new(StageInbox::new(StageConfig::new(0, Arc::new(Mode::Translate))));
        let (worker, inbox, output, stats) = worker(
            StageConfig::new(4, Arc::new(Mode::ToUpper)),
            Some(downstream.clone()),
        );

        inbox.send(&Line::from("abc"));
        inbox.close();
        worker.run();

        assert_eq!(output.lines(), vec!["[stage 1] \"ABC\""]);
        assert_eq!(stats.snapshot().lines_processed, 1);

        let (forwarded, _) = downstream.receive().expect("line forwarded");
        assert_eq!(forwarded, Line::from("ABC"));
        assert!(downstream.receive().is_none(), "shutdown should propagate");
    }

    #[test]
    fn test_failing_transform_passes_input_through() {
        let (worker, inbox, output, stats) = worker(StageConfig::new(7, Arc::new(Rejecting)), None);

        inbox.send(&Line::from("keep me"));
        inbox.close();
        worker.run();

        assert_eq!(output.lines(), vec!["[stage 1] \"keep me\""]);
        let stats = stats.snapshot();
        assert_eq!(stats.lines_processed, 1);
        assert_eq!(stats.transform_failures, 1);
    }
}
