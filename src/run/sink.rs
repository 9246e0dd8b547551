//! Single-writer result sink.
//!
//! The sink is the only consumer of the results stream and the only owner of
//! the record file and the live mirror, so nothing in here is shared or locked.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use log::error;
use tokio::sync::mpsc;

use crate::app::log_progress;
use crate::config::{
    COLUMN_ADDR, COLUMN_ERR_FLAGS, COLUMN_SERVER_NAME, COLUMN_TS, LOGGING_INTERVAL,
    OUTPUT_FILE_PREFIX,
};
use crate::error_handling::{ErrorKind, InitializationError, OutcomeStats};
use crate::probe::ComparisonResult;
use crate::strategy::StrategyRegistry;

/// Counts gathered while draining the results stream.
#[derive(Debug, Clone, Default)]
pub struct SinkSummary {
    /// Results received (written or not)
    pub total: usize,
    /// Results with an all-zero failure mask
    pub all_succeeded: usize,
    /// Results with at least one failed strategy
    pub with_failures: usize,
    /// Results produced by the per-domain deadline
    pub timed_out: usize,
    /// Results that could not be written to the record file
    pub write_errors: usize,
    /// Failed slots per error kind
    pub stats: OutcomeStats,
}

/// Creates `<dir>/comparison-<unix_ts>.csv`, refusing to overwrite an existing file.
///
/// # Errors
///
/// Returns `InitializationError::OutputFileError` if the file cannot be created.
pub fn create_record_file(
    dir: &Path,
    started_at: DateTime<Utc>,
) -> Result<(File, PathBuf), InitializationError> {
    let path = dir.join(format!(
        "{OUTPUT_FILE_PREFIX}-{}.csv",
        started_at.timestamp()
    ));
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| InitializationError::OutputFileError {
            path: path.clone(),
            source: e.into(),
        })?;
    Ok((file, path))
}

/// `ip:port` without brackets, IPv6 included.
fn addr_cell(addr: SocketAddr) -> String {
    format!("{}:{}", addr.ip(), addr.port())
}

/// Writes each result as a CSV row to `store` (flushed per row) and as an
/// abbreviated line to `mirror`.
pub struct ResultSink<W: Write, M: Write> {
    store: csv::Writer<W>,
    mirror: M,
    summary: SinkSummary,
    started: Instant,
    last_progress: Instant,
}

impl<W: Write, M: Write> ResultSink<W, M> {
    /// Wraps `store` and writes the header row derived from `registry`.
    ///
    /// # Errors
    ///
    /// Returns the CSV error if the header cannot be written and flushed.
    pub fn new(store: W, mirror: M, registry: &StrategyRegistry) -> Result<Self, csv::Error> {
        let mut writer = csv::Writer::from_writer(store);

        let mut header = vec![
            COLUMN_SERVER_NAME.to_string(),
            COLUMN_ADDR.to_string(),
            COLUMN_ERR_FLAGS.to_string(),
        ];
        header.extend(registry.error_columns());
        header.push(COLUMN_TS.to_string());
        writer.write_record(&header)?;
        writer.flush()?;

        let now = Instant::now();
        Ok(Self {
            store: writer,
            mirror,
            summary: SinkSummary::default(),
            started: now,
            last_progress: now,
        })
    }

    /// Records one result: CSV row, flush, then mirror line.
    ///
    /// The result is counted in the summary even if writing fails.
    pub fn record(&mut self, result: &ComparisonResult) -> Result<(), csv::Error> {
        self.tally(result);

        let mask = result.bit_mask();
        let outcomes = result.outcomes();

        let mut row = Vec::with_capacity(outcomes.len() + 4);
        row.push(result.server_name().to_string());
        row.push(result.addr().map(addr_cell).unwrap_or_default());
        row.push(mask.to_string());
        row.extend(outcomes.iter().map(|o| o.error_message().to_string()));
        row.push(result.timestamp().to_string());
        self.store.write_record(&row)?;
        self.store.flush()?;

        let mut line = format!("{},{}", result.server_name(), mask);
        for outcome in outcomes {
            line.push(',');
            line.push_str(outcome.error_message());
        }
        writeln!(self.mirror, "{line}")?;

        Ok(())
    }

    fn tally(&mut self, result: &ComparisonResult) {
        self.summary.total += 1;
        if result.all_succeeded() {
            self.summary.all_succeeded += 1;
        } else {
            self.summary.with_failures += 1;
        }

        let mut timed_out = false;
        for error in result.outcomes().iter().filter_map(|o| o.error()) {
            self.summary.stats.increment(error.kind());
            timed_out |= error.is(ErrorKind::Timeout);
        }
        if timed_out {
            self.summary.timed_out += 1;
        }
    }

    /// Consumes results until every sender is gone, then flushes and returns
    /// the summary. Blocks the calling thread; run it via `spawn_blocking`.
    pub fn drain(mut self, mut results: mpsc::Receiver<ComparisonResult>) -> SinkSummary {
        while let Some(result) = results.blocking_recv() {
            if let Err(e) = self.record(&result) {
                self.summary.write_errors += 1;
                error!("Failed to record result for {}: {e}", result.server_name());
            }

            if self.last_progress.elapsed() >= Duration::from_secs(LOGGING_INTERVAL) {
                log_progress(self.started, self.summary.total);
                self.last_progress = Instant::now();
            }
        }
        self.finish()
    }

    /// Flushes both outputs and returns the summary.
    pub fn finish(mut self) -> SinkSummary {
        if let Err(e) = self.store.flush() {
            error!("Failed to flush record file: {e}");
        }
        if let Err(e) = self.mirror.flush() {
            error!("Failed to flush live output: {e}");
        }
        log_progress(self.started, self.summary.total);
        self.summary
    }
}
