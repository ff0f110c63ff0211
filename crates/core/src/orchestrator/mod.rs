//! Cross-seed run orchestration.
//!
//! Input paths are processed strictly one at a time:
//! build release, search, match, decide, fetch, then persist history and
//! pause before the next search.

mod runner;
mod types;

pub use runner::{collect_input_paths, Orchestrator};
pub use types::{OrchestratorError, PathOutcome, RunSummary};
