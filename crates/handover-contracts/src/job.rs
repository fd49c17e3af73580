//! Job Queue and submission types.
//!
//! The Job Queue tracks plain pipeline jobs by numeric id. Handover
//! submissions additionally mint a token that ties the queued job to its
//! event trail in the Event Store.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Queue-assigned job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returned by `JobQueue::submit` and `JobQueue::list_all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    pub id: JobId,
    pub analysis: String,
}

/// Queue-side lifecycle of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Submitted,
    Running,
    Complete,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    pub complete: u64,
    pub total: u64,
}

/// Everything the queue knows about one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    pub id: JobId,
    pub input: Value,
    #[serde(default)]
    pub output: Option<Value>,
    pub status: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<JobProgress>,
}

/// The failure message recorded for a failed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub msg: String,
}

/// A handover request as accepted after schema validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverRequest {
    pub src_uri: String,
    pub contact: String,
    pub comment: String,
    /// Overrides the target derived from the configured server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tgt_uri: Option<String>,
}

/// Handed back to the submitter; the token is the key for status lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoverTicket {
    pub handover_token: String,
    pub job_id: JobId,
    pub tgt_uri: String,
}

/// One job enqueued while dispatching a domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessJob {
    pub process: String,
    pub job: JobId,
}

/// Result of routing one domain event to its processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub event: Value,
    pub processes: Vec<ProcessJob>,
}
