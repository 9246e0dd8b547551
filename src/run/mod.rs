//! Pipeline orchestration.
//!
//! Domain source -> shared queue -> worker pool (probe engine under deadline)
//! -> results stream -> result sink. The run ends after two joins: first the
//! workers, which closes the results stream, then the sink, which guarantees
//! every result has been flushed.

mod pool;
mod sink;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use tokio::sync::mpsc;

use crate::app::print_outcome_statistics;
use crate::config::Config;
use crate::dns::HostResolver;
use crate::domain_source::DomainSource;
use crate::error_handling::InitializationError;
use crate::initialization::init_resolver;
use crate::probe::ProbeEngine;
use crate::strategy::default_registry;

pub use pool::{probe_with_deadline, WorkerPool};
pub use sink::{create_record_file, ResultSink, SinkSummary};

/// Results of a comparison run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Domains read from the input
    pub total: usize,
    /// Domains on which every strategy succeeded
    pub all_succeeded: usize,
    /// Domains with at least one failed strategy
    pub with_failures: usize,
    /// Domains that hit the per-domain deadline
    pub timed_out: usize,
    /// Record file of this run
    pub output_path: PathBuf,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Runs a full comparison with the provided configuration.
///
/// # Errors
///
/// Fails only during setup: the domain list cannot be opened, the record file
/// cannot be created, or a TLS configuration is rejected. Per-domain failures
/// are recorded in the output, never returned.
///
/// # Example
///
/// ```no_run
/// use stack_compare::{run_comparison, Config};
/// use std::path::PathBuf;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config {
///     domains: PathBuf::from("hosts.txt"),
///     parallelism: 8,
///     ..Default::default()
/// };
/// let report = run_comparison(config).await?;
/// println!("{} domains, {} with failures", report.total, report.with_failures);
/// # Ok(())
/// # }
/// ```
pub async fn run_comparison(config: Config) -> Result<RunReport> {
    let start_time = Instant::now();
    let started_at = Utc::now();

    let domains = DomainSource::open(&config.domains).await?;
    let registry = default_registry()?;

    let (store, output_path) = create_record_file(&config.output_dir, started_at)?;
    let sink = ResultSink::new(store, io::stdout(), &registry).map_err(|source| {
        InitializationError::OutputFileError {
            path: output_path.clone(),
            source,
        }
    })?;

    let resolver: Arc<dyn HostResolver> = Arc::new(init_resolver());
    let engine = ProbeEngine::new(registry, resolver).with_probe_request(config.probe_request);
    let pool = WorkerPool::new(config.parallelism, config.timeout());

    info!(
        "Comparing {} with {} workers, {}s per domain, writing {}",
        engine.registry().names().join(", "),
        pool.workers(),
        config.timeout_seconds,
        output_path.display()
    );

    let summary = run_pipeline(&pool, engine, domains, sink).await?;
    print_outcome_statistics(&summary.stats);

    Ok(RunReport {
        total: summary.total,
        all_succeeded: summary.all_succeeded,
        with_failures: summary.with_failures,
        timed_out: summary.timed_out,
        output_path,
        elapsed_seconds: start_time.elapsed().as_secs_f64(),
    })
}

/// Wires an already-built engine, source and sink together and runs them to
/// completion.
///
/// The sink runs on a blocking thread; this returns after the workers have
/// exited and the sink has drained and flushed every result.
///
/// # Errors
///
/// Returns an error only if the sink thread panicked.
pub async fn run_pipeline<W, M>(
    pool: &WorkerPool,
    engine: ProbeEngine,
    domains: DomainSource,
    sink: ResultSink<W, M>,
) -> Result<SinkSummary>
where
    W: Write + Send + 'static,
    M: Write + Send + 'static,
{
    let (results_tx, results_rx) = mpsc::channel(pool.workers());
    let sink_task = tokio::task::spawn_blocking(move || sink.drain(results_rx));

    let queued = pool.run(Arc::new(engine), domains, results_tx).await;
    info!("All workers finished, {queued} domains probed");

    let summary = sink_task.await.context("Result sink task failed")?;
    Ok(summary)
}
