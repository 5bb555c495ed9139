//! Interrupt Bridge
//!
//! Entry point for an operator interrupt (Ctrl+C) arriving outside the
//! dispatch loop's control flow. It only flips the dispatch phase and prints
//! through the console; it never touches a mailbox or a stage lock.

use std::sync::Arc;

use tracing::{info, warn};

use crate::console::Console;
use crate::dispatch::{stage_prompt, DispatchState};

/// What the caller should do after an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptOutcome {
    /// The dispatch loop will treat the next input line as a stage number
    Reconfigure,
    /// A reconfiguration was already in progress; terminate the process
    Abort,
}

/// Cloneable handle used by the interrupt listener
#[derive(Debug, Clone)]
pub struct InterruptBridge {
    state: Arc<DispatchState>,
    console: Console,
    stage_count: usize,
}

impl InterruptBridge {
    pub fn new(state: Arc<DispatchState>, console: Console, stage_count: usize) -> Self {
        Self {
            state,
            console,
            stage_count,
        }
    }

    /// Handle one operator interrupt
    pub fn interrupt(&self) -> InterruptOutcome {
        if !self.state.try_enter_reconfiguration() {
            info!("Interrupt during reconfiguration, aborting");
            return InterruptOutcome::Abort;
        }

        info!("Interrupt received, entering stage selection");
        // Leading blank line moves past the echoed ^C
        if let Err(e) = self
            .console
            .say_all(["", stage_prompt(self.stage_count).as_str()])
        {
            warn!("Failed to write stage prompt: {}", e);
        }
        InterruptOutcome::Reconfigure
    }
}
