//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::{DEFAULT_DOMAINS_FILE, DEFAULT_PARALLELISM, DEFAULT_TIMEOUT_SECS};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Defaults: 100 workers, 20s per domain, citizenlab-domains.txt
/// stack_compare
///
/// # Smaller run from stdin
/// cat hosts.txt | stack_compare --domains - --parallelism 8 --timeout 10
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "stack_compare",
    about = "Compares TLS handshakes of several client stacks against a list of hosts."
)]
pub struct Opt {
    /// How many domains are probed concurrently
    #[arg(long, alias = "pallelism", default_value_t = DEFAULT_PARALLELISM)]
    pub parallelism: usize,

    /// Per-domain timeout in seconds after which probing is given up
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Line-delimited list of hostnames to probe ("-" reads stdin)
    #[arg(long, value_parser, default_value = DEFAULT_DOMAINS_FILE)]
    pub domains: PathBuf,

    /// Directory in which the comparison-<ts>.csv record file is created
    #[arg(long, value_parser, default_value = ".")]
    pub output_dir: PathBuf,

    /// Only perform handshakes; skip the GET request over the negotiated protocol
    #[arg(long)]
    pub handshake_only: bool,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use stack_compare::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     domains: PathBuf::from("hosts.txt"),
///     parallelism: 16,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Line-delimited hostname list, or "-" for stdin
    pub domains: PathBuf,

    /// Directory for the per-run record file
    pub output_dir: PathBuf,

    /// Number of workers
    pub parallelism: usize,

    /// Per-domain timeout in seconds
    pub timeout_seconds: u64,

    /// Issue a GET over the negotiated protocol after each successful handshake
    pub probe_request: bool,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// Per-domain deadline as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domains: PathBuf::from(DEFAULT_DOMAINS_FILE),
            output_dir: PathBuf::from("."),
            parallelism: DEFAULT_PARALLELISM,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            probe_request: true,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Self {
            domains: opt.domains,
            output_dir: opt.output_dir,
            parallelism: opt.parallelism,
            timeout_seconds: opt.timeout,
            probe_request: !opt.handshake_only,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}
