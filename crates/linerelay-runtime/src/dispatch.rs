//! Dispatch Loop
//!
//! Owns operator input and the reconfiguration state machine:
//!
//! ```text
//!   Normal --(interrupt)--> ChooseStage --(valid stage)--> ChangeMode
//!     ^                        |  (bad input: re-prompt)       |
//!     +------------------------+<----(any input)---------------+
//! ```
//!
//! The phase lives in an atomic so the interrupt bridge can move it from
//! `Normal` to `ChooseStage` while this loop is blocked reading input. Every
//! other transition happens here, after one line has been consumed.

use std::io::BufRead;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use linerelay_core::{Line, ModeId, PipelineResult};
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::events::PipelineEvent;
use crate::interrupt::InterruptBridge;
use crate::pipeline::PipelineHandle;

pub const NORMAL_PROMPT: &str = "Type string and press enter";

// ----------------------------------------------------------------------------
// Dispatch State
// ----------------------------------------------------------------------------

/// Phase of the reconfiguration state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DispatchPhase {
    Normal = 0,
    ChooseStage = 1,
    ChangeMode = 2,
}

impl DispatchPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => DispatchPhase::ChooseStage,
            2 => DispatchPhase::ChangeMode,
            _ => DispatchPhase::Normal,
        }
    }
}

/// Phase shared between the dispatch loop and the interrupt bridge
#[derive(Debug)]
pub struct DispatchState {
    phase: AtomicU8,
}

impl DispatchState {
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(DispatchPhase::Normal as u8),
        }
    }

    pub fn phase(&self) -> DispatchPhase {
        DispatchPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, phase: DispatchPhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    /// Move `Normal -> ChooseStage`; fails if a reconfiguration is already
    /// in progress.
    pub(crate) fn try_enter_reconfiguration(&self) -> bool {
        self.phase
            .compare_exchange(
                DispatchPhase::Normal as u8,
                DispatchPhase::ChooseStage as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

impl Default for DispatchState {
    fn default() -> Self {
        Self::new()
    }
}

/// Prompt asking the operator for a stage number
pub fn stage_prompt(stage_count: usize) -> String {
    format!("Choose stage number 1-{}:", stage_count)
}

/// Parse an operator selection the way `%u` would: skip leading whitespace,
/// take the leading digits and ignore whatever follows.
pub fn parse_selection(raw: &str) -> Option<usize> {
    let trimmed = raw.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

// ----------------------------------------------------------------------------
// Dispatch Loop
// ----------------------------------------------------------------------------

/// Result of handling one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The line was traced and handed to stage 1
    Dispatched,
    /// The pipeline no longer accepts lines
    PipelineClosed,
    /// A stage was chosen; waiting for its mode
    StageSelected { stage: usize },
    /// The stage selection was rejected; still choosing
    StageRejected,
    /// The stage now runs `mode`
    Reconfigured { stage: usize, mode: ModeId },
    /// The mode selection was rejected; the stage keeps its mode
    ModeRejected { stage: usize },
}

/// Single control flow feeding the pipeline
pub struct DispatchLoop {
    pipeline: PipelineHandle,
    state: Arc<DispatchState>,
    console: Console,
    pending_stage: Option<usize>,
}

impl DispatchLoop {
    pub fn new(pipeline: PipelineHandle) -> Self {
        let console = pipeline.console().clone();
        Self {
            pipeline,
            state: Arc::new(DispatchState::new()),
            console,
            pending_stage: None,
        }
    }

    pub fn state(&self) -> Arc<DispatchState> {
        self.state.clone()
    }

    pub fn phase(&self) -> DispatchPhase {
        self.state.phase()
    }

    pub fn pipeline(&self) -> &PipelineHandle {
        &self.pipeline
    }

    /// Bridge that lets an external interrupt start a reconfiguration
    pub fn interrupt_bridge(&self) -> InterruptBridge {
        InterruptBridge::new(
            self.state.clone(),
            self.console.clone(),
            self.pipeline.stage_count(),
        )
    }

    /// Read lines until end of input, then hand back the pipeline
    pub fn run<R: BufRead>(mut self, mut input: R) -> PipelineResult<PipelineHandle> {
        info!("Dispatch loop starting");
        self.say(NORMAL_PROMPT);

        let mut raw = Vec::new();
        loop {
            raw.clear();
            if input.read_until(b'\n', &mut raw)? == 0 {
                info!("End of input");
                break;
            }

            if self.handle_line(&raw) == DispatchOutcome::PipelineClosed {
                warn!("Pipeline closed, leaving dispatch loop");
                break;
            }
        }

        Ok(self.into_pipeline())
    }

    pub fn into_pipeline(self) -> PipelineHandle {
        self.pipeline
    }

    /// Consume one line of input according to the current phase.
    ///
    /// Text lines are relayed byte for byte; only stage and mode answers are
    /// decoded.
    pub fn handle_line(&mut self, raw: &[u8]) -> DispatchOutcome {
        match self.state.phase() {
            DispatchPhase::Normal => self.dispatch(raw),
            DispatchPhase::ChooseStage => self.choose_stage(raw),
            DispatchPhase::ChangeMode => self.change_mode(raw),
        }
    }

    fn dispatch(&mut self, raw: &[u8]) -> DispatchOutcome {
        let (line, truncated) = Line::from_input(raw, self.pipeline.config().max_line_len);
        if truncated {
            warn!(
                "Input exceeds {} bytes, truncating",
                self.pipeline.config().max_line_len
            );
        }

        if let Err(e) = self.console.trace(0, &line) {
            warn!("Failed to write dispatch trace: {}", e);
        }
        self.pipeline.emit(PipelineEvent::Traced {
            stage: 0,
            text: line.clone(),
        });

        debug!("Dispatching {} bytes to stage 1", line.len());
        if self.pipeline.submit(&line) {
            DispatchOutcome::Dispatched
        } else {
            DispatchOutcome::PipelineClosed
        }
    }

    fn choose_stage(&mut self, raw: &[u8]) -> DispatchOutcome {
        let stage_count = self.pipeline.stage_count();
        let answer = String::from_utf8_lossy(raw);

        let stage = match parse_selection(&answer) {
            Some(stage) => stage,
            None => {
                debug!("Unparseable stage selection {:?}", answer.trim());
                self.say_all([
                    format!("Invalid stage number {}", answer.trim()),
                    stage_prompt(stage_count),
                ]);
                return DispatchOutcome::StageRejected;
            }
        };

        let current = match self.pipeline.current_mode(stage) {
            Ok(config) => config,
            Err(e) => {
                debug!("Stage selection rejected: {}", e);
                self.say_all([
                    format!("Invalid stage number {}", stage),
                    stage_prompt(stage_count),
                ]);
                return DispatchOutcome::StageRejected;
            }
        };

        let mut menu = vec![format!(
            "Choose mode for stage {}: [{}]",
            stage,
            current.name()
        )];
        menu.extend(
            self.pipeline
                .registry()
                .catalog()
                .map(|(id, name)| format!("{}) {}", id, name)),
        );
        self.say_all(menu);

        self.pending_stage = Some(stage);
        self.state.set(DispatchPhase::ChangeMode);
        DispatchOutcome::StageSelected { stage }
    }

    fn change_mode(&mut self, raw: &[u8]) -> DispatchOutcome {
        // Any answer ends the reconfiguration, valid or not
        let stage = self.pending_stage.take();
        self.state.set(DispatchPhase::Normal);
        let answer = String::from_utf8_lossy(raw);

        let outcome = match (stage, parse_selection(&answer)) {
            (Some(stage), Some(mode)) => match self.pipeline.reconfigure(stage, mode) {
                Ok(name) => {
                    self.say(&format!("Stage {} mode: {}", stage, name));
                    DispatchOutcome::Reconfigured { stage, mode }
                }
                Err(e) => {
                    warn!("Reconfiguration of stage {} rejected: {}", stage, e);
                    self.say(&format!("Invalid mode {}", mode));
                    DispatchOutcome::ModeRejected { stage }
                }
            },
            (stage, _) => {
                self.say(&format!("Invalid mode {}", answer.trim()));
                DispatchOutcome::ModeRejected {
                    stage: stage.unwrap_or_default(),
                }
            }
        };

        self.say(NORMAL_PROMPT);
        outcome
    }

    fn say(&self, message: &str) {
        if let Err(e) = self.console.say(message) {
            warn!("Failed to write prompt: {}", e);
        }
    }

    fn say_all<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Err(e) = self.console.say_all(lines) {
            warn!("Failed to write prompt: {}", e);
        }
    }
}
