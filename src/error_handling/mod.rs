//! Error handling and outcome statistics.
//!
//! This module provides:
//! - The probe failure taxonomy (`ErrorKind`) and the error value carried in
//!   each outcome slot (`ProbeError`)
//! - Setup failures that abort a run (`InitializationError`)
//! - Per-kind failure counters kept by the result sink (`OutcomeStats`)
//!
//! Probe failures are data, not control flow: they are recorded in the output
//! and never abort the run. Only `InitializationError`s are fatal.

mod stats;
mod types;

// Re-export public API
pub use stats::OutcomeStats;
pub use types::{ErrorKind, InitializationError, ProbeError};
