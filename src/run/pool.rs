//! Bounded worker pool with a per-domain deadline.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, error, warn};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::domain_source::DomainSource;
use crate::error_handling::{ErrorKind, ProbeError};
use crate::probe::{ComparisonResult, ProbeEngine};

/// Fixed number of workers pulling hostnames from a shared queue.
///
/// Each worker probes one domain at a time under a deadline. With one worker
/// the pool degenerates to strictly sequential processing in input order.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    workers: usize,
    timeout: Duration,
}

impl WorkerPool {
    /// A pool of `workers` workers (at least one) with a per-domain `timeout`.
    pub fn new(workers: usize, timeout: Duration) -> Self {
        if workers == 0 {
            warn!("Parallelism of 0 requested, using a single worker");
        }
        Self {
            workers: workers.max(1),
            timeout,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Feeds `domains` to the workers and sends one result per domain to `results`.
    ///
    /// Returns the number of domains queued, once every worker has drained the
    /// queue and exited. `results` is dropped on return, which closes the
    /// stream for the consumer.
    pub async fn run(
        &self,
        engine: Arc<ProbeEngine>,
        domains: DomainSource,
        results: mpsc::Sender<ComparisonResult>,
    ) -> usize {
        let (queue_tx, queue_rx) = mpsc::channel::<String>(self.workers);
        let producer = tokio::spawn(feed_queue(domains, queue_tx));

        let queue = Arc::new(Mutex::new(queue_rx));
        let workers: Vec<_> = (0..self.workers)
            .map(|worker_id| {
                tokio::spawn(worker_loop(
                    worker_id,
                    Arc::clone(&queue),
                    Arc::clone(&engine),
                    results.clone(),
                    self.timeout,
                ))
            })
            .collect();
        drop(results);

        for joined in join_all(workers).await {
            if let Err(e) = joined {
                error!("Worker task failed: {e}");
            }
        }

        match producer.await {
            Ok(queued) => queued,
            Err(e) => {
                error!("Domain reader task failed: {e}");
                0
            }
        }
    }
}

/// Single producer: moves every hostname into the queue, then closes it.
async fn feed_queue(mut domains: DomainSource, queue: mpsc::Sender<String>) -> usize {
    let mut queued = 0;
    while let Some(server_name) = domains.next_domain().await {
        if queue.send(server_name).await.is_err() {
            warn!("All workers exited before the domain list was drained");
            break;
        }
        queued += 1;
    }
    queued
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<Mutex<mpsc::Receiver<String>>>,
    engine: Arc<ProbeEngine>,
    results: mpsc::Sender<ComparisonResult>,
    timeout: Duration,
) {
    loop {
        let next = queue.lock().await.recv().await;
        let Some(server_name) = next else {
            break;
        };

        let result = probe_with_deadline(&engine, server_name, timeout).await;
        if results.send(result).await.is_err() {
            warn!("Result sink closed, worker {worker_id} stopping");
            break;
        }
    }
    debug!("Worker {worker_id} finished");
}

/// Probes one domain in its own task and races it against `timeout`.
///
/// If the deadline wins, the probe's cancellation token is fired so its
/// in-flight dial or handshake is torn down, and a timeout result is returned
/// right away without waiting for that teardown.
pub async fn probe_with_deadline(
    engine: &Arc<ProbeEngine>,
    server_name: String,
    timeout: Duration,
) -> ComparisonResult {
    let slots = engine.registry().len();
    let cancel = CancellationToken::new();

    let mut task = tokio::spawn({
        let engine = Arc::clone(engine);
        let cancel = cancel.clone();
        let server_name = server_name.clone();
        async move { engine.probe(&server_name, &cancel).await }
    });

    tokio::select! {
        joined = &mut task => match joined {
            Ok(result) => result,
            Err(e) => {
                error!("Probe task for {server_name} failed: {e}");
                ComparisonResult::uniform(
                    server_name,
                    None,
                    ProbeError::new(ErrorKind::Internal, format!("probe task failed: {e}")),
                    slots,
                )
            }
        },
        _ = tokio::time::sleep(timeout) => {
            warn!(
                "Giving up on {server_name} after {}s",
                timeout.as_secs_f32()
            );
            cancel.cancel();
            ComparisonResult::timed_out(server_name, slots)
        }
    }
}
