use std::time::{Duration, Instant};

/// Measures how long a phase of work took.
pub struct Timer {
    start_time: Instant,
}

impl Timer {
    /// Create a new `Timer`, started now.
    pub fn now() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Restart the timer.
    pub fn reset(&mut self) {
        self.start_time = Instant::now();
    }

    /// Time elapsed since the timer was last reset.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Print `what` with the elapsed time to stderr.
    pub fn print_elapsed(&self, what: &str) {
        eprintln!("{what} took {:.2} ms", self.elapsed_ms());
    }
}
