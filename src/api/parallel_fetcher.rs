// src/api/parallel_fetcher.rs
//! Parallel player lookups using work-stealing concurrency.
//!
//! Each identifier becomes one lookup. Workers pull lookups until the queue
//! is drained; a failed lookup is recorded and never stops the others.

use super::concurrent_queue::{ConcurrentWorkQueue, LookupOutcome, QueuedLookup, WorkerQueue};
use super::PlayerRepository;
use crate::config::FetchSettings;
use crate::constants::MAX_FETCH_WORKERS;
use crate::error::{AppError, FetchFailure};
use crate::extract::IdentifierSet;
use crate::model::EntityRecord;
use crossbeam::deque::Stealer;
use std::sync::Arc;
use tokio::task::JoinSet;

/// Everything a batch of lookups produced.
///
/// `records` and `failures` together account for every identifier exactly
/// once, each list in the identifier set's order.
#[derive(Debug, Clone, Default)]
pub struct FetchBatch {
    pub records: Vec<EntityRecord>,
    pub failures: Vec<FetchFailure>,
    pub attempted: usize,
}

impl FetchBatch {
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Queue-based fetcher that spreads lookups over a fixed set of workers.
pub struct PlayerFetcher {
    client: Arc<dyn PlayerRepository>,
    num_workers: usize,
}

impl PlayerFetcher {
    /// Creates a fetcher sized by the configured concurrency.
    pub fn new(client: Arc<dyn PlayerRepository>, settings: &FetchSettings) -> Self {
        Self::with_workers(client, settings.concurrency)
    }

    /// Creates a fetcher with a specific number of workers.
    pub fn with_workers(client: Arc<dyn PlayerRepository>, num_workers: usize) -> Self {
        Self {
            client,
            num_workers: num_workers.clamp(1, MAX_FETCH_WORKERS),
        }
    }

    /// Creates a sequential fetcher (single worker).
    pub fn sequential(client: Arc<dyn PlayerRepository>) -> Self {
        Self::with_workers(client, 1)
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Looks up every identifier once and partitions the results.
    pub async fn fetch_all(&self, ids: &IdentifierSet) -> Result<FetchBatch, AppError> {
        if ids.is_empty() {
            log::info!("No players to look up");
            return Ok(FetchBatch::default());
        }

        let num_workers = self.num_workers.min(ids.len());
        let (queue, workers) = ConcurrentWorkQueue::new(num_workers);
        queue.enqueue_all(ids.iter());
        let total = queue.total();

        log::info!(
            "Looking up {} players with {} worker(s)",
            total,
            num_workers
        );

        let mut join_set = JoinSet::new();
        let queue_arc = Arc::new(queue);
        let stealers = queue_arc.stealers().to_vec();

        for worker in workers {
            let queue = Arc::clone(&queue_arc);
            let client = Arc::clone(&self.client);
            let stealers = stealers.clone();

            join_set.spawn(async move { run_lookup_loop(worker, &*client, &queue, &stealers).await });
        }

        while let Some(result) = join_set.join_next().await {
            result.map_err(|e| AppError::InternalError {
                message: format!(
                    "Lookup worker task failed with join error: {}. This may indicate a panic in the worker.",
                    e
                ),
                source: None,
            })?;
        }

        let queue = Arc::try_unwrap(queue_arc).map_err(|_| AppError::InternalError {
            message: "Lookup queue still shared after all workers finished".to_string(),
            source: None,
        })?;

        if queue.has_pending_work() {
            return Err(AppError::InternalError {
                message: format!(
                    "Only {} of {} lookups completed before the workers stopped",
                    queue.completed(),
                    total
                ),
                source: None,
            });
        }

        Ok(assemble_batch(queue.collect_results(), total))
    }
}

/// Worker loop: dequeue, look up, record, until nothing is left to steal.
async fn run_lookup_loop(
    worker_queue: WorkerQueue,
    client: &dyn PlayerRepository,
    global_queue: &ConcurrentWorkQueue,
    stealers: &[Stealer<QueuedLookup>],
) {
    loop {
        let Some(QueuedLookup { position, id }) = worker_queue.dequeue(stealers) else {
            break;
        };
        let result = client.fetch_player(&id).await;

        if let Err(failure) = &result {
            log::warn!("Lookup failed for {}", failure);
        }

        let completed = global_queue.store_result(LookupOutcome { position, result });
        log::info!("Fetching({} of {})", completed, global_queue.total());
    }
    log::debug!("No pending lookups, worker exiting");
}

/// Restores identifier-set order and splits successes from failures.
fn assemble_batch(mut outcomes: Vec<LookupOutcome>, attempted: usize) -> FetchBatch {
    outcomes.sort_by_key(|outcome| outcome.position);

    let mut batch = FetchBatch {
        attempted,
        ..FetchBatch::default()
    };
    for outcome in outcomes {
        match outcome.result {
            Ok(record) => batch.records.push(record),
            Err(failure) => batch.failures.push(failure),
        }
    }

    log::info!(
        "Lookups complete: {} succeeded, {} failed",
        batch.records.len(),
        batch.failures.len()
    );
    batch
}
