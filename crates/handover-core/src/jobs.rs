//! Plain Job Queue jobs: submit, report, delete, list.
//!
//! Database copy and healthcheck jobs are tracked by the queue alone, without
//! an event trail. Reports come in three formats selected by name: the full
//! result (default), the failure message, or the result addressed to an email
//! recipient for a notifier to deliver.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use handover_contracts::{
    error::{HandoverError, HandoverResult},
    job::{JobFailure, JobHandle, JobId, JobResult},
};

use crate::traits::JobQueue;

/// The shape a job report is requested in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportFormat {
    Result,
    Failures,
    Email { recipient: String },
}

impl ReportFormat {
    /// Resolve a `format` request parameter.
    ///
    /// `None` selects the full result. `"email"` needs a non-empty
    /// recipient. Any other name is a `Format` error.
    pub fn parse(format: Option<&str>, email: Option<&str>) -> HandoverResult<Self> {
        match format {
            None => Ok(Self::Result),
            Some("failures") => Ok(Self::Failures),
            Some("email") => match email.map(str::trim).filter(|e| !e.is_empty()) {
                Some(recipient) => Ok(Self::Email {
                    recipient: recipient.to_string(),
                }),
                None => Err(HandoverError::Format {
                    reason: "email format requires a recipient address".to_string(),
                }),
            },
            Some(other) => Err(HandoverError::Format {
                reason: format!("format '{other}' not known"),
            }),
        }
    }
}

/// A job report in the requested format.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobReport {
    Result(JobResult),
    Failure(JobFailure),
    /// The result without its output, addressed to `email`.
    Email {
        email: String,
        #[serde(flatten)]
        result: JobResult,
    },
}

/// Job operations for one analysis.
pub struct JobService {
    queue: Arc<dyn JobQueue>,
    analysis: String,
}

impl JobService {
    pub fn new(queue: Arc<dyn JobQueue>, analysis: impl Into<String>) -> Self {
        Self {
            queue,
            analysis: analysis.into(),
        }
    }

    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    /// Enqueue a job. The payload must be a JSON object.
    pub fn submit(&self, payload: Value) -> HandoverResult<JobHandle> {
        if !payload.is_object() {
            return Err(HandoverError::Validation {
                reason: "job payload must be a JSON object".to_string(),
            });
        }
        let handle = self.queue.submit(&self.analysis, payload)?;
        info!(analysis = %self.analysis, job_id = %handle.id, "job submitted");
        Ok(handle)
    }

    pub fn report(&self, id: JobId, format: &ReportFormat) -> HandoverResult<JobReport> {
        debug!(job_id = %id, format = ?format, "retrieving job report");
        match format {
            ReportFormat::Result => Ok(JobReport::Result(self.queue.get_status(id)?)),
            ReportFormat::Failures => Ok(JobReport::Failure(self.queue.get_failure_message(id)?)),
            ReportFormat::Email { recipient } => {
                let mut result = self.queue.get_status(id)?;
                result.output = None;
                Ok(JobReport::Email {
                    email: recipient.clone(),
                    result,
                })
            }
        }
    }

    pub fn delete(&self, id: JobId) -> HandoverResult<()> {
        self.queue.delete(id)?;
        info!(analysis = %self.analysis, job_id = %id, "job deleted");
        Ok(())
    }

    /// Results of every job on this analysis, oldest first.
    pub fn list(&self) -> HandoverResult<Vec<JobResult>> {
        self.queue
            .list_all(&self.analysis)?
            .into_iter()
            .map(|handle| self.queue.get_status(handle.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use handover_contracts::{error::HandoverError, job::JobState};

    use super::*;
    use crate::fixtures::VecQueue;

    #[test]
    fn format_names_resolve() {
        assert_eq!(ReportFormat::parse(None, None).unwrap(), ReportFormat::Result);
        assert_eq!(
            ReportFormat::parse(Some("failures"), None).unwrap(),
            ReportFormat::Failures
        );
        assert_eq!(
            ReportFormat::parse(Some("email"), Some("joe@example.org")).unwrap(),
            ReportFormat::Email {
                recipient: "joe@example.org".to_string()
            }
        );
    }

    #[test]
    fn unknown_format_is_a_format_error() {
        match ReportFormat::parse(Some("xml"), None) {
            Err(HandoverError::Format { reason }) => assert!(reason.contains("xml")),
            other => panic!("expected Format, got {:?}", other),
        }
        assert!(matches!(
            ReportFormat::parse(Some("email"), Some("  ")),
            Err(HandoverError::Format { .. })
        ));
    }

    #[test]
    fn submit_and_report_result() {
        let queue = VecQueue::new();
        let jobs = JobService::new(queue.clone(), "copy_database");

        let handle = jobs
            .submit(json!({ "source_db_uri": "mysql://p/db_93_1", "target_db_uri": "mysql://s/" }))
            .unwrap();
        assert_eq!(handle.analysis, "copy_database");

        match jobs.report(handle.id, &ReportFormat::Result).unwrap() {
            JobReport::Result(result) => {
                assert_eq!(result.status, JobState::Submitted);
                assert_eq!(result.input["source_db_uri"], "mysql://p/db_93_1");
            }
            other => panic!("expected Result, got {:?}", other),
        }
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let jobs = JobService::new(VecQueue::new(), "copy_database");
        assert!(matches!(
            jobs.submit(json!(["not", "an", "object"])),
            Err(HandoverError::Validation { .. })
        ));
    }

    #[test]
    fn failures_and_email_formats() {
        let queue = VecQueue::new();
        let jobs = JobService::new(queue.clone(), "copy_database");
        let handle = jobs.submit(json!({ "source_db_uri": "a" })).unwrap();
        queue.fail(handle.id, "Table meta is missing");

        match jobs.report(handle.id, &ReportFormat::Failures).unwrap() {
            JobReport::Failure(failure) => assert_eq!(failure.msg, "Table meta is missing"),
            other => panic!("expected Failure, got {:?}", other),
        }

        let email = ReportFormat::parse(Some("email"), Some("joe@example.org")).unwrap();
        let report = jobs.report(handle.id, &email).unwrap();
        let doc = serde_json::to_value(&report).unwrap();
        assert_eq!(doc["email"], "joe@example.org");
        assert_eq!(doc["status"], "failed");
        assert!(doc["output"].is_null());
    }

    #[test]
    fn unknown_job_is_not_found() {
        let jobs = JobService::new(VecQueue::new(), "copy_database");
        assert!(matches!(
            jobs.report(JobId(42), &ReportFormat::Result),
            Err(HandoverError::NotFound { .. })
        ));
        assert!(matches!(jobs.delete(JobId(42)), Err(HandoverError::NotFound { .. })));
    }

    #[test]
    fn list_covers_only_this_analysis() {
        let queue = VecQueue::new();
        let copies = JobService::new(queue.clone(), "copy_database");
        let checks = JobService::new(queue.clone(), "healthcheck");

        copies.submit(json!({ "n": 1 })).unwrap();
        checks.submit(json!({ "n": 2 })).unwrap();
        copies.submit(json!({ "n": 3 })).unwrap();

        let listed: Vec<i64> = copies
            .list()
            .unwrap()
            .iter()
            .map(|r| r.input["n"].as_i64().unwrap())
            .collect();
        assert_eq!(listed, vec![1, 3]);

        let first = copies.list().unwrap()[0].id;
        copies.delete(first).unwrap();
        assert_eq!(copies.list().unwrap().len(), 1);
    }
}
