//! Pipeline Builder API
//!
//! Creates every stage inbox in the empty state with the default mode, then
//! starts one thread per stage. The returned handle is the only producer for
//! stage 1 and the only writer of stage configurations.

use std::sync::Arc;
use std::thread::JoinHandle;

use linerelay_core::{
    Line, ModeId, PipelineConfig, PipelineError, PipelineResult, TransformRegistry, STAGE_COUNT,
};
use tracing::{info, warn};

use crate::console::Console;
use crate::events::{EventSender, EventTap, PipelineEvent, StageStats, StageStatsSnapshot};
use crate::stage::{StageConfig, StageInbox, StageWorker};

// ----------------------------------------------------------------------------
// Pipeline Builder
// ----------------------------------------------------------------------------

/// Builder for a running stage pipeline
pub struct PipelineBuilder {
    config: PipelineConfig,
    registry: TransformRegistry,
    console: Option<Console>,
    event_sender: Option<EventSender>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            registry: TransformRegistry::builtin(),
            console: None,
            event_sender: None,
        }
    }

    /// Set the pipeline configuration
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the transform registry
    pub fn with_registry(mut self, registry: TransformRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Mode every stage starts in
    pub fn default_mode(mut self, mode: ModeId) -> Self {
        self.config.default_mode = mode;
        self
    }

    /// Route trace output to `console` instead of stdout
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = Some(console);
        self
    }

    /// Mirror pipeline activity into an event channel
    pub fn with_event_tap(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Build and start the stage threads
    pub fn build_and_start(self) -> PipelineResult<PipelineHandle> {
        self.config.validate(&self.registry)?;

        let transform = self.registry.lookup(self.config.default_mode)?;
        let initial = StageConfig::new(self.config.default_mode, transform);
        let console = self.console.unwrap_or_else(Console::stdout);
        let events = EventTap::new(self.event_sender);

        info!(
            "Building pipeline with {} stages in mode {}",
            STAGE_COUNT,
            initial.name()
        );

        // All inboxes exist before any thread starts
        let inboxes: Vec<Arc<StageInbox>> = (0..STAGE_COUNT)
            .map(|_| Arc::new(StageInbox::new(initial.clone())))
            .collect();
        let stats: Vec<Arc<StageStats>> = (0..STAGE_COUNT)
            .map(|_| Arc::new(StageStats::default()))
            .collect();

        let mut workers = Vec::with_capacity(STAGE_COUNT);
        for (index, inbox) in inboxes.iter().enumerate() {
            let worker = StageWorker::new(
                index + 1,
                inbox.clone(),
                inboxes.get(index + 1).cloned(),
                console.clone(),
                events.clone(),
                stats[index].clone(),
            );

            match worker.spawn() {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Release the stages that did start before reporting
                    for inbox in &inboxes {
                        inbox.close();
                    }
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(e);
                }
            }
        }

        info!("Pipeline started");

        Ok(PipelineHandle {
            config: self.config,
            registry: self.registry,
            console,
            events,
            inboxes,
            stats,
            workers,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ----------------------------------------------------------------------------
// Pipeline Handle
// ----------------------------------------------------------------------------

/// Handle to a running pipeline
pub struct PipelineHandle {
    config: PipelineConfig,
    registry: TransformRegistry,
    console: Console,
    events: EventTap,
    inboxes: Vec<Arc<StageInbox>>,
    stats: Vec<Arc<StageStats>>,
    workers: Vec<JoinHandle<()>>,
}

impl PipelineHandle {
    pub fn stage_count(&self) -> usize {
        self.inboxes.len()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    /// Hand a line to stage 1, blocking while its slot is still occupied.
    ///
    /// Returns `false` once the pipeline has been shut down.
    pub fn submit(&self, line: &Line) -> bool {
        self.inboxes[0].send(line)
    }

    /// Switch stage `stage` (1-based) to mode `mode`.
    ///
    /// The mode and its transform are written in the stage's own critical
    /// section, so a line is always processed with a consistent pair.
    pub fn reconfigure(&self, stage: usize, mode: ModeId) -> PipelineResult<String> {
        let inbox = self.inbox(stage)?;
        let transform = self.registry.lookup(mode)?;
        let name = transform.name().to_string();

        inbox.configure(|config| *config = StageConfig::new(mode, transform));

        info!("Stage {} switched to mode {} ({})", stage, mode, name);
        self.events.emit(PipelineEvent::Reconfigured {
            stage,
            mode,
            name: name.clone(),
        });
        Ok(name)
    }

    /// Current mode of stage `stage` (1-based)
    pub fn current_mode(&self, stage: usize) -> PipelineResult<StageConfig> {
        Ok(self.inbox(stage)?.config())
    }

    /// Counters of stage `stage` (1-based)
    pub fn stats(&self, stage: usize) -> PipelineResult<StageStatsSnapshot> {
        self.check_stage(stage)?;
        Ok(self.stats[stage - 1].snapshot())
    }

    /// Record the dispatch loop's own trace as stage 0
    pub(crate) fn emit(&self, event: PipelineEvent) {
        self.events.emit(event);
    }

    /// Close stage 1 and wait until every stage has drained and exited
    pub fn shutdown(mut self) {
        info!("Pipeline shutdown requested");
        self.inboxes[0].close();

        for (index, handle) in self.workers.drain(..).enumerate() {
            if handle.join().is_err() {
                warn!("Stage {} panicked", index + 1);
            }
        }

        info!("Pipeline stopped");
    }

    fn inbox(&self, stage: usize) -> PipelineResult<&Arc<StageInbox>> {
        self.check_stage(stage)?;
        Ok(&self.inboxes[stage - 1])
    }

    fn check_stage(&self, stage: usize) -> PipelineResult<()> {
        if stage == 0 || stage > self.inboxes.len() {
            return Err(PipelineError::InvalidStage {
                stage,
                count: self.inboxes.len(),
            });
        }
        Ok(())
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        // Lets the stage threads exit even if `shutdown` was never called
        self.inboxes[0].close();
    }
}

impl std::fmt::Debug for PipelineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineHandle")
            .field("config", &self.config)
            .field("stages", &self.inboxes.len())
            .finish_non_exhaustive()
    }
}
