//! stack_compare library: TLS client stack comparison
//!
//! Probes a list of hostnames with several TLS client stacks (a standard one
//! and fingerprint-shaped ones) and records, per host, which handshakes
//! failed. A host that completes the standard handshake but fails a
//! fingerprint-shaped one points at interference keyed on the client hello.
//!
//! # Example
//!
//! ```no_run
//! use stack_compare::{run_comparison, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     domains: std::path::PathBuf::from("hosts.txt"),
//!     parallelism: 50,
//!     timeout_seconds: 10,
//!     ..Default::default()
//! };
//!
//! let report = run_comparison(config).await?;
//! println!("Results saved in {}", report.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a multi-threaded Tokio runtime: the result sink runs
//! on a blocking thread.

mod app;
pub mod config;
pub mod dns;
mod domain_source;
mod error_handling;
pub mod initialization;
mod probe;
mod run;
pub mod strategy;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use domain_source::DomainSource;
pub use error_handling::{ErrorKind, InitializationError, OutcomeStats, ProbeError};
pub use probe::{dial, ComparisonResult, ProbeEngine, ProbeOutcome};
pub use run::{
    create_record_file, probe_with_deadline, run_comparison, run_pipeline, ResultSink,
    RunReport, SinkSummary, WorkerPool,
};
