//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorKind, OutcomeStats};

/// Logs failed-slot counts per error kind.
pub fn print_outcome_statistics(stats: &OutcomeStats) {
    let total = stats.total();
    if total == 0 {
        info!("No failed handshakes recorded");
        return;
    }

    info!("Failure Counts ({} slots total):", total);
    for kind in ErrorKind::iter() {
        let count = stats.get_count(kind);
        if count > 0 {
            info!("   {}: {}", kind.as_ref(), count);
        }
    }
}
