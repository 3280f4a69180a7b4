//! # Import Jobs
//!
//! Runs imports in the background and keeps their progress where a caller
//! can poll it.
//!
//! ## Job Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   start(importer, csv, user) ──► job id                                │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌─────────┐   report(percent, status, detail)   ┌─────────────────┐  │
//! │   │ Running │ ◄─────────────────────────────────── │ import task     │  │
//! │   └────┬────┘                                      │ (tokio::spawn)  │  │
//! │        │ task ends                                 └─────────────────┘  │
//! │        ▼                                                                │
//! │   Completed / Failed ── status(id) polls any time                      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   take_result(id) ── returns the outcome once, then forgets the job    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no cancel: a started import runs to the end. A caller that
//! loses interest just stops polling. Finished jobs nobody collects are
//! dropped once they are older than the store's retention (an hour by
//! default); the sweep runs whenever a job starts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{InterchangeError, InterchangeResult};
use crate::importer::{ImportOutcome, SalesImporter};
use crate::progress::ProgressSink;

// =============================================================================
// Job Status
// =============================================================================

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    /// The import ran; row failures are in the outcome.
    Completed,
    /// The import could not run at all.
    Failed,
}

/// A pollable snapshot of one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct JobStatus {
    pub id: String,
    pub state: JobState,
    pub percent: u8,
    pub status: String,
    pub detail: String,
}

/// How long a finished, uncollected job is kept.
pub const DEFAULT_JOB_RETENTION: Duration = Duration::from_secs(60 * 60);

struct JobEntry {
    status: JobStatus,
    result: Option<InterchangeResult<ImportOutcome>>,
    finished_at: Option<Instant>,
}

// =============================================================================
// Import Jobs
// =============================================================================

/// In-memory job store. Clones share the same jobs.
#[derive(Clone)]
pub struct ImportJobs {
    jobs: Arc<Mutex<HashMap<String, JobEntry>>>,
    retention: Duration,
}

impl Default for ImportJobs {
    fn default() -> Self {
        Self::with_retention(DEFAULT_JOB_RETENTION)
    }
}

impl ImportJobs {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that forgets uncollected finished jobs after `retention`.
    pub fn with_retention(retention: Duration) -> Self {
        ImportJobs {
            jobs: Arc::default(),
            retention,
        }
    }

    /// Starts `importer` on the runtime and returns the job ID.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start(&self, importer: SalesImporter, csv: String, user_id: String) -> String {
        let id = Uuid::new_v4().to_string();

        let mut jobs = self.entries();
        self.sweep(&mut jobs);
        jobs.insert(
            id.clone(),
            JobEntry {
                status: JobStatus {
                    id: id.clone(),
                    state: JobState::Running,
                    percent: 0,
                    status: "Queued".to_string(),
                    detail: String::new(),
                },
                result: None,
                finished_at: None,
            },
        );
        drop(jobs);

        info!(job_id = %id, company_id = %importer.company_id(), "Import job queued");

        let sink = JobProgress {
            jobs: self.clone(),
            id: id.clone(),
        };
        let import = tokio::spawn(async move {
            importer
                .import_with_progress(&csv, &user_id, &sink)
                .await
        });

        let jobs = self.clone();
        let job_id = id.clone();
        tokio::spawn(async move {
            let result = match import.await {
                Ok(result) => result,
                Err(join_err) => Err(InterchangeError::TaskFailed(join_err.to_string())),
            };
            jobs.finish(&job_id, result);
        });

        id
    }

    /// Current status, or `None` for an unknown (or already collected) job.
    pub fn status(&self, id: &str) -> Option<JobStatus> {
        self.entries().get(id).map(|entry| entry.status.clone())
    }

    /// Returns the finished job's outcome and forgets the job.
    ///
    /// ## Returns
    /// * `Err(JobNotFound)` - unknown ID, or the result was already taken
    /// * `Err(JobNotFinished)` - still running; the job is kept
    /// * the import's own result otherwise
    pub fn take_result(&self, id: &str) -> InterchangeResult<ImportOutcome> {
        let mut jobs = self.entries();

        match jobs.get(id) {
            None => return Err(InterchangeError::JobNotFound(id.to_string())),
            Some(entry) if entry.result.is_none() => {
                return Err(InterchangeError::JobNotFinished(id.to_string()))
            }
            Some(_) => {}
        }

        jobs.remove(id)
            .and_then(|entry| entry.result)
            .unwrap_or_else(|| Err(InterchangeError::JobNotFound(id.to_string())))
    }

    fn update(&self, id: &str, percent: u8, status: &str, detail: &str) {
        if let Some(entry) = self.entries().get_mut(id) {
            entry.status.percent = percent;
            entry.status.status = status.to_string();
            entry.status.detail = detail.to_string();
        }
    }

    fn finish(&self, id: &str, result: InterchangeResult<ImportOutcome>) {
        let mut jobs = self.entries();
        let Some(entry) = jobs.get_mut(id) else {
            return;
        };

        match &result {
            Ok(outcome) => {
                info!(
                    job_id = %id,
                    successful = outcome.successful,
                    failed = outcome.failed,
                    "Import job completed"
                );
                entry.status.state = JobState::Completed;
                entry.status.percent = 100;
            }
            Err(err) => {
                error!(job_id = %id, error = %err, "Import job failed");
                entry.status.state = JobState::Failed;
                entry.status.status = "Import failed".to_string();
                entry.status.detail = err.to_string();
            }
        }
        entry.result = Some(result);
        entry.finished_at = Some(Instant::now());
    }

    fn sweep(&self, jobs: &mut HashMap<String, JobEntry>) {
        let before = jobs.len();
        jobs.retain(|_, entry| {
            entry
                .finished_at
                .map_or(true, |at| at.elapsed() < self.retention)
        });

        let evicted = before - jobs.len();
        if evicted > 0 {
            debug!(evicted, "Dropped uncollected import jobs");
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, JobEntry>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Writes an import's progress into its job entry.
struct JobProgress {
    jobs: ImportJobs,
    id: String,
}

impl ProgressSink for JobProgress {
    fn report(&self, percent: u8, status: &str, detail: &str) {
        self.jobs.update(&self.id, percent, status, detail);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
