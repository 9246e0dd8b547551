//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, ports, limits)
//! - CLI option types and parsing
//! - The library-level `Config` used by `run_comparison`

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, Opt};
