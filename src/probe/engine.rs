//! Per-domain probe orchestration.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;

use crate::config::{TCP_CONNECT_TIMEOUT, TLS_PORT};
use crate::dns::HostResolver;
use crate::strategy::{ProbeStrategy, StrategyRegistry};

use super::dial::dial;
use super::outcome::{ComparisonResult, ProbeOutcome};

/// Runs every registered strategy against one domain.
///
/// Rules, in order:
/// 1. No address from DNS: every slot is a DNS failure, nothing is dialed.
/// 2. The baseline (first) strategy cannot even connect: every slot carries
///    that connect error, no other strategy is tried.
/// 3. Otherwise each strategy gets its own fresh connection and its own
///    outcome; a failure in one never stops the next.
///
/// Strategies run one after the other; parallelism only exists across domains.
pub struct ProbeEngine {
    registry: StrategyRegistry,
    resolver: Arc<dyn HostResolver>,
    port: u16,
    connect_timeout: Duration,
    probe_request: bool,
}

/// Runs `fut` unless `cancel` fires first.
async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

impl ProbeEngine {
    pub fn new(registry: StrategyRegistry, resolver: Arc<dyn HostResolver>) -> Self {
        Self {
            registry,
            resolver,
            port: TLS_PORT,
            connect_timeout: TCP_CONNECT_TIMEOUT,
            probe_request: true,
        }
    }

    /// Overrides the dialed port (443 by default).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enables or disables the GET issued after each successful handshake.
    pub fn with_probe_request(mut self, enabled: bool) -> Self {
        self.probe_request = enabled;
        self
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Probes `server_name` with every strategy.
    ///
    /// `cancel` is checked around every network step. A cancelled probe stops
    /// at its next suspension point and returns a timeout result, which the
    /// worker pool has already emitted on its own by then.
    pub async fn probe(&self, server_name: &str, cancel: &CancellationToken) -> ComparisonResult {
        match self.try_probe(server_name, cancel).await {
            Some(result) => result,
            None => {
                debug!("{server_name}: probe cancelled");
                ComparisonResult::timed_out(server_name, self.registry.len())
            }
        }
    }

    async fn try_probe(
        &self,
        server_name: &str,
        cancel: &CancellationToken,
    ) -> Option<ComparisonResult> {
        let slots = self.registry.len();

        let addrs = match until_cancelled(cancel, self.resolver.lookup(server_name)).await? {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!("{server_name}: lookup failed: {e}");
                Vec::new()
            }
        };
        let Some(ip) = addrs.first().copied() else {
            return Some(ComparisonResult::dns_failed(server_name, slots));
        };
        let addr = SocketAddr::new(ip, self.port);
        debug!("{server_name}: resolved to {addr}");

        let mut outcomes = Vec::with_capacity(slots);
        for (position, strategy) in self.registry.iter().enumerate() {
            let conn = match until_cancelled(cancel, dial(addr, self.connect_timeout)).await? {
                Ok(conn) => conn,
                Err(e) if position == 0 => {
                    debug!("{server_name}: baseline could not connect, skipping other strategies");
                    return Some(ComparisonResult::uniform(server_name, Some(addr), e, slots));
                }
                Err(e) => {
                    outcomes.push(ProbeOutcome::Failure(e));
                    continue;
                }
            };

            let outcome = until_cancelled(
                cancel,
                self.run_strategy(strategy.as_ref(), conn, server_name),
            )
            .await?;
            outcomes.push(outcome);
        }

        Some(ComparisonResult::new(server_name, Some(addr), outcomes))
    }

    async fn run_strategy(
        &self,
        strategy: &dyn ProbeStrategy,
        conn: TcpStream,
        server_name: &str,
    ) -> ProbeOutcome {
        let session = match strategy.handshake(conn, server_name).await {
            Ok(session) => session,
            Err(e) => {
                debug!("{server_name}: {} handshake failed: {e}", strategy.name());
                return ProbeOutcome::Failure(e);
            }
        };

        if self.probe_request {
            if let Err(e) = strategy.issue_probe_request(session, server_name).await {
                debug!("{server_name}: {} request failed: {e}", strategy.name());
                return ProbeOutcome::Failure(e);
            }
        }

        ProbeOutcome::Success
    }
}
