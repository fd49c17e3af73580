//! In-memory implementation of `JobQueue`.
//!
//! Jobs are held in a `BTreeMap` keyed by id, so listings come back in
//! submission order. Nothing runs the jobs: the worker side is driven through
//! `start`, `set_progress`, `complete` and `fail`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use handover_contracts::{
    error::{HandoverError, HandoverResult},
    job::{JobFailure, JobHandle, JobId, JobProgress, JobResult, JobState},
};
use handover_core::traits::JobQueue;

struct QueuedJob {
    analysis: String,
    result: JobResult,
    failure: Option<String>,
}

pub(crate) struct QueueState {
    jobs: BTreeMap<JobId, QueuedJob>,
    next_id: u64,
}

/// An in-memory job queue.
#[derive(Clone)]
pub struct InMemoryJobQueue {
    state: Arc<Mutex<QueueState>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                jobs: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Mark a job as picked up by a worker.
    pub fn start(&self, id: JobId) -> HandoverResult<()> {
        self.update(id, |job| job.result.status = JobState::Running)
    }

    pub fn set_progress(&self, id: JobId, complete: u64, total: u64) -> HandoverResult<()> {
        self.update(id, |job| {
            job.result.status = JobState::Running;
            job.result.progress = Some(JobProgress { complete, total });
        })
    }

    pub fn complete(&self, id: JobId, output: Value) -> HandoverResult<()> {
        self.update(id, |job| {
            job.result.status = JobState::Complete;
            job.result.output = Some(output);
        })?;
        info!(job_id = %id, "job complete");
        Ok(())
    }

    pub fn fail(&self, id: JobId, msg: impl Into<String>) -> HandoverResult<()> {
        let msg = msg.into();
        warn!(job_id = %id, msg = %msg, "job failed");
        self.update(id, |job| {
            job.result.status = JobState::Failed;
            job.failure = Some(msg);
        })
    }

    fn update<F>(&self, id: JobId, change: F) -> HandoverResult<()>
    where
        F: FnOnce(&mut QueuedJob),
    {
        let mut state = self.lock()?;
        let job = state
            .jobs
            .get_mut(&id)
            .ok_or_else(|| HandoverError::not_found("job", id))?;
        change(job);
        Ok(())
    }

    fn lock(&self) -> HandoverResult<MutexGuard<'_, QueueState>> {
        self.state.lock().map_err(|e| HandoverError::QueueUnavailable {
            reason: format!("job queue lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryJobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue for InMemoryJobQueue {
    fn submit(&self, analysis: &str, payload: Value) -> HandoverResult<JobHandle> {
        let mut state = self.lock()?;
        let id = JobId(state.next_id);
        state.next_id += 1;

        state.jobs.insert(
            id,
            QueuedJob {
                analysis: analysis.to_string(),
                result: JobResult {
                    id,
                    input: payload,
                    output: None,
                    status: JobState::Submitted,
                    progress: None,
                },
                failure: None,
            },
        );
        debug!(job_id = %id, analysis = %analysis, "job queued");

        Ok(JobHandle {
            id,
            analysis: analysis.to_string(),
        })
    }

    fn get_status(&self, id: JobId) -> HandoverResult<JobResult> {
        self.lock()?
            .jobs
            .get(&id)
            .map(|job| job.result.clone())
            .ok_or_else(|| HandoverError::not_found("job", id))
    }

    /// The failure message of a failed job. A job that has not failed has
    /// none, which is `NotFound`.
    fn get_failure_message(&self, id: JobId) -> HandoverResult<JobFailure> {
        let state = self.lock()?;
        let job = state
            .jobs
            .get(&id)
            .ok_or_else(|| HandoverError::not_found("job", id))?;
        job.failure
            .clone()
            .map(|msg| JobFailure { msg })
            .ok_or_else(|| HandoverError::not_found("failure for job", id))
    }

    fn delete(&self, id: JobId) -> HandoverResult<()> {
        self.lock()?
            .jobs
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| HandoverError::not_found("job", id))
    }

    fn list_all(&self, analysis: &str) -> HandoverResult<Vec<JobHandle>> {
        Ok(self
            .lock()?
            .jobs
            .iter()
            .filter(|(_, job)| job.analysis == analysis)
            .map(|(id, job)| JobHandle {
                id: *id,
                analysis: job.analysis.clone(),
            })
            .collect())
    }
}
