//! Line Relay Core
//!
//! Building blocks shared by the line relay runtime and CLI:
//! - `Line`: bounded byte buffer moved between stages
//! - `Mailbox`: single-slot blocking handoff with attached stage configuration
//! - `TransformRegistry`: ordered catalog of in-place line transforms
//! - `PipelineConfig` and the error types used across the workspace

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod errors;
pub mod line;
pub mod mailbox;
pub mod transform;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::{PipelineConfig, STAGE_COUNT};
pub use errors::{PipelineError, PipelineResult, Result, TransformError};
pub use line::{Line, DEFAULT_MAX_LINE_LEN};
pub use mailbox::{Mailbox, SlotStatus};
pub use transform::{Mode, ModeId, Transform, TransformRegistry};
