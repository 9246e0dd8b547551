//! Outcome statistics tracking.

use std::collections::HashMap;
use strum::IntoEnumIterator;

use super::types::ErrorKind;

/// Per-kind failure counters.
///
/// Owned by the result sink, which is the single consumer of results, so the
/// counters are plain integers rather than atomics.
#[derive(Debug, Clone)]
pub struct OutcomeStats {
    failures: HashMap<ErrorKind, usize>,
}

impl OutcomeStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in ErrorKind::iter() {
            failures.insert(kind, 0);
        }
        OutcomeStats { failures }
    }

    pub fn increment(&mut self, kind: ErrorKind) {
        *self.failures.entry(kind).or_insert(0) += 1;
    }

    pub fn get_count(&self, kind: ErrorKind) -> usize {
        self.failures.get(&kind).copied().unwrap_or(0)
    }

    /// Total failed slots across all kinds.
    pub fn total(&self) -> usize {
        self.failures.values().sum()
    }
}

impl Default for OutcomeStats {
    fn default() -> Self {
        Self::new()
    }
}
