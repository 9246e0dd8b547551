//! DNS resolver initialization.
//!
//! This module builds the resolver used for hostname lookups, starting from the
//! system configuration (`/etc/resolv.conf`, hosts file) with bounded timeouts.

use std::time::Duration;

use log::warn;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::system_conf::read_system_conf;
use hickory_resolver::TokioAsyncResolver;

use crate::config::{DNS_ATTEMPTS, DNS_TIMEOUT_SECS};
use crate::dns::SystemResolver;

/// Initializes the DNS resolver for hostname lookups.
///
/// Uses the system resolver configuration so lookups behave like a standard
/// libc lookup. If the system configuration cannot be read, falls back to the
/// library's default upstream servers.
pub fn init_resolver() -> SystemResolver {
    let (config, mut opts) = match read_system_conf() {
        Ok(conf) => conf,
        Err(e) => {
            warn!("Unable to read system DNS configuration ({e}), using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };

    opts.timeout = Duration::from_secs(DNS_TIMEOUT_SECS);
    opts.attempts = DNS_ATTEMPTS;
    // Hostnames are probed as given, never with search domains appended
    opts.ndots = 0;

    SystemResolver::new(TokioAsyncResolver::tokio(config, opts))
}
