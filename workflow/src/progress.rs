use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Raised by [`Progress`] checks once cancellation has been requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("computation was cancelled")]
pub struct Cancelled;

#[derive(Debug, Default)]
struct ProgressInner {
    cancelled: AtomicBool,
    maximum: AtomicU64,
    current: AtomicU64,
    subtask: Mutex<String>,
}

/// Progress and cancellation handle shared between a running computation and
/// the engine.
///
/// Cancellation is cooperative: the engine calls [`Progress::cancel`], and the
/// algorithm is expected to notice on its next call to
/// [`Progress::check_for_cancel`] or [`Progress::increment_progress`] and
/// return [`Cancelled`] instead of a result.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    inner: Arc<ProgressInner>,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the computation using this handle.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Fail with [`Cancelled`] if cancellation was requested.
    #[inline]
    pub fn check_for_cancel(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    /// Describe the step currently being computed.
    pub fn set_subtask(&self, label: &str) {
        if let Ok(mut subtask) = self.inner.subtask.lock() {
            subtask.clear();
            subtask.push_str(label);
        }
    }

    pub fn subtask(&self) -> String {
        self.inner
            .subtask
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Set the number of steps in the current subtask and reset the count.
    pub fn set_maximum(&self, maximum: u64) {
        self.inner.maximum.store(maximum, Ordering::Relaxed);
        self.inner.current.store(0, Ordering::Relaxed);
    }

    /// Record one finished step, then check for cancellation.
    pub fn increment_progress(&self) -> Result<(), Cancelled> {
        self.inner.current.fetch_add(1, Ordering::Relaxed);
        self.check_for_cancel()
    }

    /// Record `current` finished steps, then check for cancellation.
    pub fn set_progress(&self, current: u64) -> Result<(), Cancelled> {
        self.inner.current.store(current, Ordering::Relaxed);
        self.check_for_cancel()
    }

    /// Fraction of the current subtask done, if a maximum was set.
    pub fn fraction(&self) -> Option<f64> {
        let maximum = self.inner.maximum.load(Ordering::Relaxed);
        if maximum == 0 {
            return None;
        }
        let current = self.inner.current.load(Ordering::Relaxed).min(maximum);
        Some(current as f64 / maximum as f64)
    }
}
