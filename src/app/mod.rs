//! Run-level reporting.
//!
//! This module provides progress logging and the end-of-run statistics
//! printed by the result sink and the orchestrator.

pub mod logging;
pub mod statistics;

// Re-export public API
pub use logging::log_progress;
pub use statistics::print_outcome_statistics;
