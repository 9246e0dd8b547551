//! Probe outcomes and the per-domain comparison record.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};

use crate::error_handling::ProbeError;

/// Result of one strategy against one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Handshake (and probe request, when enabled) succeeded.
    Success,
    Failure(ProbeError),
}

impl ProbeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ProbeOutcome::Failure(_))
    }

    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            ProbeOutcome::Failure(e) => Some(e),
            ProbeOutcome::Success => None,
        }
    }

    /// Failure message, or the empty string on success (the `err_*` cell).
    pub fn error_message(&self) -> &str {
        self.error().map(ProbeError::message).unwrap_or("")
    }
}

/// Everything recorded for one domain.
///
/// Fields are private: a result is built once by the engine or the worker
/// pool and only read afterwards. The failure mask is always recomputed from
/// the outcomes.
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    server_name: String,
    addr: Option<SocketAddr>,
    outcomes: Vec<ProbeOutcome>,
    created_at: DateTime<Utc>,
}

impl ComparisonResult {
    /// `outcomes` must be in registry order, one per strategy.
    pub fn new(
        server_name: impl Into<String>,
        addr: Option<SocketAddr>,
        outcomes: Vec<ProbeOutcome>,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            addr,
            outcomes,
            created_at: Utc::now(),
        }
    }

    /// The same failure in every one of `slots` positions.
    pub fn uniform(
        server_name: impl Into<String>,
        addr: Option<SocketAddr>,
        error: ProbeError,
        slots: usize,
    ) -> Self {
        Self::new(
            server_name,
            addr,
            vec![ProbeOutcome::Failure(error); slots],
        )
    }

    pub fn dns_failed(server_name: impl Into<String>, slots: usize) -> Self {
        Self::uniform(server_name, None, ProbeError::dns_resolution(), slots)
    }

    pub fn timed_out(server_name: impl Into<String>, slots: usize) -> Self {
        Self::uniform(server_name, None, ProbeError::timeout(), slots)
    }

    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    pub fn outcomes(&self) -> &[ProbeOutcome] {
        &self.outcomes
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Unix seconds of creation (the `ts` column).
    pub fn timestamp(&self) -> i64 {
        self.created_at.timestamp()
    }

    /// Bit `i` is set iff strategy `i` failed.
    pub fn bit_mask(&self) -> u64 {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, outcome)| outcome.is_failure())
            .fold(0u64, |mask, (i, _)| mask | (1u64 << i))
    }

    pub fn all_succeeded(&self) -> bool {
        self.bit_mask() == 0
    }
}
