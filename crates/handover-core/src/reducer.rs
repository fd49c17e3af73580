//! Status reduction: current state of one handover from its event trail.
//!
//! The reducer never looks at the whole trail. It asks the store for two
//! records at most, in a fixed precedence:
//!
//!   1. the most recent ERROR  → `failed`, progress omitted
//!   2. the most recent INFO   → `pending` / `running` / `complete`
//!   3. neither                → `NotFound`
//!
//! The two lookups stay separate queries so that an ERROR always wins,
//! whatever INFO events were written before or after it.

use std::sync::Arc;

use tracing::debug;

use handover_contracts::{
    error::{HandoverError, HandoverResult},
    event::{EventRecord, ReportType, StoredEvent},
    query::{EventFilter, EventQuery},
    status::{HandoverStatus, StatusView},
};

use crate::traits::EventStore;

/// Message conventions the reducer uses when progress counters are absent.
#[derive(Debug, Clone)]
pub struct ReducerOptions {
    /// Prefix of the INFO event written at submission time.
    pub submission_marker: String,
    /// Case-insensitive substrings that mark a finished handover.
    pub completion_markers: Vec<String>,
}

impl Default for ReducerOptions {
    fn default() -> Self {
        Self {
            submission_marker: "Handling".to_string(),
            completion_markers: vec![
                "handover successful".to_string(),
                "handover complete".to_string(),
            ],
        }
    }
}

/// Reject a token that cannot identify a job, before any store round trip.
pub fn validate_token(token: &str) -> HandoverResult<()> {
    if token.trim().is_empty() {
        return Err(HandoverError::InvalidToken {
            reason: "handover token must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Computes a `StatusView` for a token from the Event Store.
///
/// Holds no state between calls: two calls with no intervening writes return
/// identical views, and any number of threads may share one reducer.
pub struct StatusReducer {
    store: Arc<dyn EventStore>,
    options: ReducerOptions,
}

impl StatusReducer {
    pub fn new(store: Arc<dyn EventStore>, options: ReducerOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &ReducerOptions {
        &self.options
    }

    /// Reduce every event of `token` to its current status.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if `token` is empty (no query is made)
    /// - `NotFound` if the token has no events, e.g. unknown or purged
    /// - `StoreUnavailable` if either lookup fails
    pub fn reduce(&self, token: &str) -> HandoverResult<StatusView> {
        validate_token(token)?;

        if let Some(error) = self.latest(token, ReportType::Error)? {
            debug!(token = %token, event_id = %error.id, "latest ERROR event found");
            return Ok(view(&error, HandoverStatus::Failed, false));
        }

        if let Some(info) = self.latest(token, ReportType::Info)? {
            let status = self.classify(&info.record);
            debug!(token = %token, event_id = %info.id, status = %status, "latest INFO event found");
            return Ok(view(&info, status, true));
        }

        debug!(token = %token, "no events for token");
        Err(HandoverError::not_found("handover token", token))
    }

    /// The most recent event of one type for `token`, if any.
    pub fn latest(&self, token: &str, report_type: ReportType) -> HandoverResult<Option<StoredEvent>> {
        let query = EventQuery::latest(EventFilter::token(token).report_type(report_type));
        Ok(self.store.query(&query)?.into_iter().next())
    }

    /// Status implied by an INFO record.
    ///
    /// Progress counters decide when present. Otherwise the message does: the
    /// submission event means `pending` whatever it contains, a completion
    /// marker means `complete`, anything else `running`.
    pub fn classify(&self, record: &EventRecord) -> HandoverStatus {
        let params = record.params();
        if let (Some(complete), Some(total)) = (params.progress_complete, params.progress_total) {
            return if complete < total {
                HandoverStatus::Running
            } else {
                HandoverStatus::Complete
            };
        }

        // Submission messages embed the request's free text, so markers in
        // them say nothing about progress.
        if record.message().starts_with(&self.options.submission_marker) {
            return HandoverStatus::Pending;
        }

        let message = record.message().to_lowercase();
        if self
            .options
            .completion_markers
            .iter()
            .any(|marker| message.contains(&marker.to_lowercase()))
        {
            HandoverStatus::Complete
        } else {
            HandoverStatus::Running
        }
    }
}

fn view(event: &StoredEvent, status: HandoverStatus, with_progress: bool) -> StatusView {
    let params = event.record.params();
    StatusView {
        id: event.id.clone(),
        handover_token: params.handover_token.clone(),
        status,
        current_message: event.record.message().to_string(),
        comment: params.comment.clone(),
        contact: params.contact.clone(),
        src_uri: params.src_uri.clone(),
        tgt_uri: params.tgt_uri.clone(),
        report_time: event.record.report_time(),
        progress_complete: params.progress_complete.filter(|_| with_progress),
        progress_total: params.progress_total.filter(|_| with_progress),
        submission_message: None,
    }
}
