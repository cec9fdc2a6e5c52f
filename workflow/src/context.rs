use std::cmp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crate::Error;

/// Settings used to build an [`EngineContext`].
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Number of computation threads; defaults to the available parallelism.
    pub worker_threads: Option<usize>,
}

impl EngineConfig {
    pub fn with_worker_threads(worker_threads: usize) -> Self {
        Self {
            worker_threads: Some(worker_threads),
        }
    }

    fn worker_threads(&self) -> usize {
        if let Some(count) = self.worker_threads {
            return cmp::max(1, count);
        }
        thread::available_parallelism().map_or(1, |n| n.get())
    }
}

/// Counters shared by every workflow using the same context.
#[derive(Debug, Default)]
pub struct EngineStats {
    launched: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    cancelled: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub launched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
}

impl EngineStats {
    pub(crate) fn record_launch(&self) {
        self.launched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancel(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            launched: self.launched.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
        }
    }
}

/// Process-wide engine resources: the computation thread pool and counters.
///
/// Passed explicitly to each [`crate::Workflow`]; several workflows may share
/// one context (and so one pool) by cloning it.
#[derive(Clone)]
pub struct EngineContext {
    pool: Arc<rayon::ThreadPool>,
    stats: Arc<EngineStats>,
    worker_threads: usize,
}

impl EngineContext {
    pub fn new(config: &EngineConfig) -> Result<Self, Error> {
        let worker_threads = config.worker_threads();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|i| format!("phyloflow-worker-{i}"))
            .build()?;
        log::debug!("started engine with {worker_threads} worker threads");
        Ok(Self {
            pool: Arc::new(pool),
            stats: Arc::new(EngineStats::default()),
            worker_threads,
        })
    }

    pub fn worker_threads(&self) -> usize {
        self.worker_threads
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub(crate) fn stats_handle(&self) -> Arc<EngineStats> {
        Arc::clone(&self.stats)
    }

    pub(crate) fn spawn(&self, job: impl FnOnce() + Send + 'static) {
        self.pool.spawn(job);
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("worker_threads", &self.worker_threads)
            .field("stats", &self.stats.snapshot())
            .finish()
    }
}
