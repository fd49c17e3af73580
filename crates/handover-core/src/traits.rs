//! Collaborator trait definitions.
//!
//! The service owns no state of its own. Everything it knows comes through
//! three seams:
//!
//! - `EventStore`: append-only, queryable log of job events
//! - `JobQueue`: external task execution and tracking
//! - `SubmissionValidator`: structural check of incoming handover requests
//!
//! Implementations are injected at construction time. Calls are never retried
//! here; a transport failure surfaces as `StoreUnavailable` or
//! `QueueUnavailable` and the caller decides what to do.

use serde_json::Value;

use handover_contracts::{
    error::HandoverResult,
    event::{EventId, EventRecord, StoredEvent},
    job::{JobFailure, JobHandle, JobId, JobResult},
    query::{EventFilter, EventQuery},
};

/// The Event Store: where workers report progress and failures.
///
/// Records are appended and purged by filter, never updated in place.
pub trait EventStore: Send + Sync {
    /// Append one validated record and return the id the store assigned.
    fn append(&self, record: EventRecord) -> HandoverResult<EventId>;

    /// Return the records matching `query`, sorted and paged as it requests.
    ///
    /// Reads are idempotent and reflect every write committed before the
    /// call began.
    fn query(&self, query: &EventQuery) -> HandoverResult<Vec<StoredEvent>>;

    /// Remove every record matching `filter` and return how many were removed.
    ///
    /// Deleting by token is naturally idempotent: a second call removes zero.
    fn delete_by_filter(&self, filter: &EventFilter) -> HandoverResult<usize>;
}

/// The Job Queue: runs pipeline analyses and tracks their progress.
pub trait JobQueue: Send + Sync {
    /// Enqueue `payload` on the named analysis.
    fn submit(&self, analysis: &str, payload: Value) -> HandoverResult<JobHandle>;

    /// Current input, output, state and progress of a job.
    fn get_status(&self, id: JobId) -> HandoverResult<JobResult>;

    /// The failure message of a failed job.
    fn get_failure_message(&self, id: JobId) -> HandoverResult<JobFailure>;

    fn delete(&self, id: JobId) -> HandoverResult<()>;

    /// Every job ever submitted to the named analysis, oldest first.
    fn list_all(&self, analysis: &str) -> HandoverResult<Vec<JobHandle>>;
}

/// Structural validation of a handover request body.
pub trait SubmissionValidator: Send + Sync {
    /// Return `Ok(())` if `request` is acceptable, `Validation` otherwise.
    fn validate(&self, request: &Value) -> HandoverResult<()>;
}
