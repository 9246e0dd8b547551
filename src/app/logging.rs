//! Progress logging utilities.

use log::info;
use std::time::Instant;

/// Logs how many domains have been recorded so far and the recording rate.
///
/// # Arguments
///
/// * `start_time` - When the sink started consuming results
/// * `recorded` - Number of results written so far
pub fn log_progress(start_time: Instant, recorded: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        recorded as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Recorded {} domains in {:.2} seconds (~{:.2} domains/sec)",
        recorded, elapsed_secs, rate
    );
}
