//! Ctrl+C wiring for the interrupt bridge

use std::future::Future;
use std::io;

use tracing::debug;

use linerelay_runtime::{InterruptBridge, InterruptOutcome};

use crate::error::{CliError, Result};

/// Exit status used when an interrupt aborts a reconfiguration
pub const ABORT_EXIT_CODE: i32 = 2;

/// Forward every Ctrl+C to the bridge.
///
/// Returns `Ok` once an interrupt arrives while a reconfiguration is already
/// in progress; the caller is expected to terminate the process. Failing to
/// register the handler is returned as an error.
pub async fn listen_for_interrupts(bridge: InterruptBridge) -> Result<()> {
    forward_interrupts(bridge, tokio::signal::ctrl_c).await
}

/// Forward each signal produced by `next_signal` to the bridge
pub async fn forward_interrupts<F, Fut>(bridge: InterruptBridge, mut next_signal: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<()>>,
{
    loop {
        next_signal()
            .await
            .map_err(|e| CliError::Signal(format!("Failed to listen for Ctrl+C: {}", e)))?;

        match bridge.interrupt() {
            InterruptOutcome::Reconfigure => debug!("Ctrl+C: stage selection started"),
            InterruptOutcome::Abort => return Ok(()),
        }
    }
}
