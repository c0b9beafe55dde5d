// src/api/concurrent_queue.rs
//! Concurrent work-stealing queue implementation for parallel lookups.
//!
//! Every identifier is pushed once into a global injector. Workers move
//! items into their local FIFO and steal from each other when they run dry,
//! so an item is only ever held by one worker and is looked up exactly once.

use crate::error::FetchFailure;
use crate::model::EntityRecord;
use crate::types::PlayerId;
use crossbeam::deque::{Injector, Steal, Stealer, Worker};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// One pending lookup. `position` is the identifier's place in the set.
#[derive(Debug, Clone)]
pub struct QueuedLookup {
    pub position: usize,
    pub id: PlayerId,
}

/// The result of one lookup, tagged with where its identifier sat in the set.
#[derive(Debug, Clone)]
pub struct LookupOutcome {
    pub position: usize,
    pub result: Result<EntityRecord, FetchFailure>,
}

/// Tracks work queue completion state
#[derive(Debug, Default)]
struct WorkTracker {
    /// Number of lookups queued
    pending_work: AtomicUsize,
    /// Number of lookups finished, successfully or not
    completed_work: AtomicUsize,
}

impl WorkTracker {
    fn add_pending(&self, count: usize) {
        self.pending_work.fetch_add(count, Ordering::SeqCst);
    }

    /// Returns the completed count including this one.
    fn mark_completed(&self) -> usize {
        self.completed_work.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn pending(&self) -> usize {
        self.pending_work.load(Ordering::SeqCst)
    }

    fn completed(&self) -> usize {
        self.completed_work.load(Ordering::SeqCst)
    }
}

/// Thread-safe lookup queue with work-stealing support.
pub struct ConcurrentWorkQueue {
    /// Global injector for queued lookups
    injector: Arc<Injector<QueuedLookup>>,
    /// Stealers for work-stealing between workers
    stealers: Vec<Stealer<QueuedLookup>>,
    /// Append-only outcome collector shared by all workers
    results: Mutex<Vec<LookupOutcome>>,
    /// Work completion tracker
    work_tracker: WorkTracker,
}

impl ConcurrentWorkQueue {
    /// Creates a new queue and one local queue per worker.
    pub fn new(num_workers: usize) -> (Self, Vec<WorkerQueue>) {
        let injector = Arc::new(Injector::new());
        let mut workers = Vec::with_capacity(num_workers);
        let mut stealers = Vec::with_capacity(num_workers);

        for _ in 0..num_workers {
            let worker = Worker::new_fifo();
            stealers.push(worker.stealer());
            workers.push(WorkerQueue {
                worker,
                injector: Arc::clone(&injector),
            });
        }

        let queue = Self {
            injector,
            stealers,
            results: Mutex::new(Vec::new()),
            work_tracker: WorkTracker::default(),
        };

        (queue, workers)
    }

    /// Enqueues identifiers, numbering them in iteration order.
    pub fn enqueue_all<'a>(&self, ids: impl IntoIterator<Item = &'a PlayerId>) {
        let mut count = 0;
        for (position, id) in ids.into_iter().enumerate() {
            self.injector.push(QueuedLookup {
                position,
                id: id.clone(),
            });
            count += 1;
        }
        self.work_tracker.add_pending(count);
    }

    /// Number of lookups queued so far.
    pub fn total(&self) -> usize {
        self.work_tracker.pending()
    }

    /// Number of lookups finished so far.
    pub fn completed(&self) -> usize {
        self.work_tracker.completed()
    }

    /// Checks if there is any unfinished work.
    pub fn has_pending_work(&self) -> bool {
        self.work_tracker.pending() > self.work_tracker.completed()
    }

    /// Records an outcome and marks its lookup complete. Returns the completed count.
    pub fn store_result(&self, outcome: LookupOutcome) -> usize {
        self.results.lock().push(outcome);
        self.work_tracker.mark_completed()
    }

    /// Collects all outcomes.
    pub fn collect_results(self) -> Vec<LookupOutcome> {
        self.results.into_inner()
    }

    /// Stealers for every worker's local queue.
    pub fn stealers(&self) -> &[Stealer<QueuedLookup>] {
        &self.stealers
    }
}

/// Per-worker queue with work-stealing capabilities.
pub struct WorkerQueue {
    /// Local work queue
    worker: Worker<QueuedLookup>,
    /// Reference to global injector
    injector: Arc<Injector<QueuedLookup>>,
}

impl WorkerQueue {
    /// Dequeues a lookup: local queue first, then a batch from the injector,
    /// then whatever another worker has buffered.
    ///
    /// `None` means every queue was observed empty; nothing new is ever
    /// enqueued once workers start, so the worker can stop.
    pub fn dequeue(&self, stealers: &[Stealer<QueuedLookup>]) -> Option<QueuedLookup> {
        if let Some(item) = self.worker.pop() {
            return Some(item);
        }

        std::iter::repeat_with(|| {
            self.injector
                .steal_batch_and_pop(&self.worker)
                .or_else(|| stealers.iter().map(Stealer::steal).collect::<Steal<_>>())
        })
        .find(|steal| !steal.is_retry())
        .and_then(Steal::success)
    }
}
