//! Configuration constants.
//!
//! This module defines the operational constants used throughout the application,
//! including ports, timeouts, and size limits.

use std::time::Duration;

/// Default number of domains probed at the same time.
pub const DEFAULT_PARALLELISM: usize = 100;

/// Default per-domain time budget in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Default domain list read when `--domains` is not given.
pub const DEFAULT_DOMAINS_FILE: &str = "citizenlab-domains.txt";

/// Input path that selects stdin instead of a file.
pub const STDIN_PATH: &str = "-";

/// Prefix of the per-run record file (`comparison-<unix_ts>.csv`).
pub const OUTPUT_FILE_PREFIX: &str = "comparison";

// Network operation timeouts
/// Port every strategy dials (TLS default).
pub const TLS_PORT: u16 = 443;
/// TCP connection timeout, fixed for every dial.
pub const TCP_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// DNS query timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 5;
/// DNS attempts per query before giving up
pub const DNS_ATTEMPTS: usize = 2;

/// ALPN identifiers offered by every built-in strategy, in preference order.
pub const ALPN_H2: &str = "h2";
pub const ALPN_HTTP11: &str = "http/1.1";

/// Upper bound on the HTTP/1.1 response head read by the probe request.
/// Anything larger is reported as a request failure instead of being buffered.
pub const MAX_RESPONSE_HEAD_SIZE: usize = 64 * 1024;

/// One bit per strategy in a `u64` failure mask.
pub const MAX_STRATEGIES: usize = 64;

/// Seconds between progress log lines emitted by the result sink.
pub const LOGGING_INTERVAL: u64 = 5;

// Fixed failure messages, written verbatim into the `err_*` columns.
pub const MSG_DNS_RESOLUTION: &str = "unable to lookup IP";
pub const MSG_CONNECT: &str = "unable to connect";
pub const MSG_TIMEOUT: &str = "timeout reached";

// Record file columns around the per-strategy `err_<name>` columns
pub const COLUMN_SERVER_NAME: &str = "server_name";
pub const COLUMN_ADDR: &str = "addr";
pub const COLUMN_ERR_FLAGS: &str = "err_flags";
pub const COLUMN_ERR_PREFIX: &str = "err_";
pub const COLUMN_TS: &str = "ts";
