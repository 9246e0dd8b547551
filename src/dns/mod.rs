//! Hostname resolution.
//!
//! The probe engine only needs "hostname to ordered address list". That
//! capability is a trait so tests can substitute a fixed table for the network.

use std::net::IpAddr;

use async_trait::async_trait;
use hickory_resolver::TokioAsyncResolver;

/// Resolves a hostname to an ordered list of addresses.
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Returns the addresses in resolver order. An empty list and an error are
    /// treated identically by the engine; the error text is only logged.
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, String>;
}

/// Resolver backed by the system DNS configuration.
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    pub fn new(inner: TokioAsyncResolver) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn lookup(&self, host: &str) -> Result<Vec<IpAddr>, String> {
        let response = self
            .inner
            .lookup_ip(host)
            .await
            .map_err(|e| e.to_string())?;
        Ok(response.iter().collect())
    }
}
