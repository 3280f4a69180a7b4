//! # Import Progress
//!
//! The sink an import reports to after every row.
//!
//! ```text
//!   SalesImporter ──report(percent, status, detail)──► ProgressSink
//!                                                        │
//!                     ┌──────────────────────────────────┼──────────────┐
//!                     ▼                                  ▼              ▼
//!               NoOpProgress                      FnProgress      JobProgress
//!               (simple import)              (CLI progress line)  (ImportJobs,
//!                                                                 polled later)
//! ```

/// Receives progress updates from a running import.
pub trait ProgressSink: Send + Sync {
    /// Reports progress.
    ///
    /// `percent` is `floor(processed / total * 100)`, so it never exceeds 100.
    fn report(&self, percent: u8, status: &str, detail: &str);
}

/// Discards every update.
pub struct NoOpProgress;

impl ProgressSink for NoOpProgress {
    fn report(&self, _percent: u8, _status: &str, _detail: &str) {}
}

/// Adapts a closure into a [`ProgressSink`].
///
/// ## Example
/// ```rust
/// use tally_interchange::{FnProgress, ProgressSink};
///
/// let sink = FnProgress::new(|percent, status, _detail| {
///     println!("{percent:>3}% {status}");
/// });
/// sink.report(50, "Importing", "1 successful, 0 failed");
/// ```
pub struct FnProgress<F>(F);

impl<F> FnProgress<F>
where
    F: Fn(u8, &str, &str) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        FnProgress(f)
    }
}

impl<F> ProgressSink for FnProgress<F>
where
    F: Fn(u8, &str, &str) + Send + Sync,
{
    fn report(&self, percent: u8, status: &str, detail: &str) {
        (self.0)(percent, status, detail)
    }
}

/// `floor(processed / total * 100)`, clamped to 100. An empty file is done.
pub(crate) fn percent_of(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed.min(total) * 100) / total) as u8
}
