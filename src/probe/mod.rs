//! Per-domain probing.
//!
//! This module provides:
//! - `ProbeOutcome` / `ComparisonResult`: the per-strategy outcomes of one domain
//!   and the failure bit-mask derived from them
//! - `dial`: TCP connect with the fixed connect timeout
//! - `ProbeEngine`: resolution, short-circuit rules and sequential strategy runs

mod dial;
mod engine;
mod outcome;

pub use dial::dial;
pub use engine::ProbeEngine;
pub use outcome::{ComparisonResult, ProbeOutcome};
