//! Handover submission and purge.
//!
//! Submitting a handover mints the token that every later event for the job
//! carries, enqueues the pipeline job, and writes the "Handling" INFO event
//! that the release listing scans for. Purging removes a token's whole event
//! trail in one operation.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use handover_contracts::{
    error::{HandoverError, HandoverResult},
    event::{EventParams, EventRecord, ReportType},
    job::{HandoverRequest, HandoverTicket},
    query::EventFilter,
};

use crate::{
    reducer::validate_token,
    traits::{EventStore, JobQueue, SubmissionValidator},
};

/// Where handover jobs go.
#[derive(Debug, Clone)]
pub struct SubmissionOptions {
    /// Job Queue analysis that runs the handover pipeline.
    pub analysis: String,
    /// Server the database is handed over to, e.g. `mysql://user@staging:3306/`.
    pub target_server_uri: String,
    /// Prefix of the INFO event written on submission.
    pub submission_marker: String,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            analysis: "handover_database".to_string(),
            target_server_uri: String::new(),
            submission_marker: "Handling".to_string(),
        }
    }
}

/// Target URI for `src_uri`: the configured server plus the source's
/// database name (its last path segment).
pub fn derive_target_uri(target_server_uri: &str, src_uri: &str) -> HandoverResult<String> {
    if target_server_uri.trim().is_empty() {
        return Err(HandoverError::Config {
            reason: "no target server configured and request has no tgt_uri".to_string(),
        });
    }
    let db_name = src_uri
        .rsplit_once('/')
        .map(|(_, name)| name)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| HandoverError::Validation {
            reason: format!("src_uri '{src_uri}' does not end in a database name"),
        })?;
    Ok(format!("{}/{}", target_server_uri.trim_end_matches('/'), db_name))
}

/// Accepts handover submissions and purges handover trails.
pub struct HandoverService {
    store: Arc<dyn EventStore>,
    queue: Arc<dyn JobQueue>,
    validator: Box<dyn SubmissionValidator>,
    options: SubmissionOptions,
}

impl HandoverService {
    pub fn new(
        store: Arc<dyn EventStore>,
        queue: Arc<dyn JobQueue>,
        validator: Box<dyn SubmissionValidator>,
        options: SubmissionOptions,
    ) -> Self {
        Self {
            store,
            queue,
            validator,
            options,
        }
    }

    /// Submit a handover request body.
    ///
    /// The job is enqueued before the submission event is written, so a
    /// queue failure leaves no orphan "Handling" event behind.
    ///
    /// # Errors
    ///
    /// - `Validation` if the body fails the schema or lacks a database name
    /// - `Config` if no target can be derived
    /// - `QueueUnavailable` / `StoreUnavailable` from the collaborators
    pub fn submit(&self, body: &Value) -> HandoverResult<HandoverTicket> {
        self.validator.validate(body)?;
        let request: HandoverRequest =
            serde_json::from_value(body.clone()).map_err(|e| HandoverError::Validation {
                reason: format!("handover request is malformed: {e}"),
            })?;

        let tgt_uri = match request.tgt_uri.as_deref() {
            Some(uri) if !uri.trim().is_empty() => uri.to_string(),
            _ => derive_target_uri(&self.options.target_server_uri, &request.src_uri)?,
        };
        let token = Uuid::new_v4().to_string();

        let spec = json!({
            "handover_token": token,
            "src_uri": request.src_uri,
            "tgt_uri": tgt_uri,
            "contact": request.contact,
            "comment": request.comment,
        });

        debug!(token = %token, src_uri = %request.src_uri, "submitting handover job");
        let job = self.queue.submit(&self.options.analysis, spec.clone())?;

        let params = EventParams {
            handover_token: token.clone(),
            src_uri: request.src_uri,
            tgt_uri: tgt_uri.clone(),
            contact: request.contact,
            comment: request.comment,
            progress_complete: None,
            progress_total: None,
        };
        let message = format!("{} {}", self.options.submission_marker, spec);
        let record = EventRecord::new(ReportType::Info, Utc::now(), message, params)?;
        self.store.append(record)?;

        info!(token = %token, job_id = %job.id, tgt_uri = %tgt_uri, "handover submitted");

        Ok(HandoverTicket {
            handover_token: token,
            job_id: job.id,
            tgt_uri,
        })
    }

    /// Delete every event of `token`. Returns the number removed; purging an
    /// unknown or already-purged token removes zero and is not an error.
    pub fn purge(&self, token: &str) -> HandoverResult<usize> {
        validate_token(token)?;
        let removed = self.store.delete_by_filter(&EventFilter::token(token))?;
        info!(token = %token, removed, "handover events purged");
        Ok(removed)
    }
}
