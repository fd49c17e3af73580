//! Release listing: every handover submitted for a release, with live status.
//!
//! 1. Fetch recent submission events (INFO, message starts with the
//!    submission marker, target URI ends in `_R` or `_R_N`).
//! 2. Keep those whose *source* URI the `ReleaseMatcher` accepts.
//! 3. Reduce each surviving token to its current status.
//!
//! The whole listing is built before it is returned: if the store fails at
//! any point the call fails and no partial list escapes.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info};

use handover_contracts::{
    error::{HandoverError, HandoverResult},
    event::{ReportType, StoredEvent},
    query::{EventField, EventFilter, EventQuery},
    status::StatusView,
};

use crate::{reducer::StatusReducer, release::ReleaseMatcher, traits::EventStore};

/// Tuning for the submission scan.
#[derive(Debug, Clone)]
pub struct ListingOptions {
    /// Maximum number of submission events read per listing.
    pub page_size: usize,
    /// Keep only the most recent submission per token. Off by default: a
    /// token that was submitted twice is listed twice.
    pub deduplicate_tokens: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            page_size: 1000,
            deduplicate_tokens: false,
        }
    }
}

/// Reject a release that is not a decimal generation number.
pub fn validate_release(release: &str) -> HandoverResult<()> {
    if release.is_empty() || !release.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HandoverError::InvalidRelease {
            release: release.to_string(),
        });
    }
    Ok(())
}

/// The handovers of one release, newest submission first.
///
/// A consume-once iterator over views that were fully assembled before the
/// listing call returned.
#[derive(Debug)]
pub struct ReleaseListing {
    release: String,
    views: std::vec::IntoIter<StatusView>,
}

impl ReleaseListing {
    pub fn release(&self) -> &str {
        &self.release
    }
}

impl Iterator for ReleaseListing {
    type Item = StatusView;

    fn next(&mut self) -> Option<StatusView> {
        self.views.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.views.size_hint()
    }
}

impl ExactSizeIterator for ReleaseListing {}

/// Builds release listings from the Event Store.
pub struct ListingService {
    store: Arc<dyn EventStore>,
    reducer: StatusReducer,
    matcher: ReleaseMatcher,
    options: ListingOptions,
}

impl ListingService {
    pub fn new(
        store: Arc<dyn EventStore>,
        reducer: StatusReducer,
        matcher: ReleaseMatcher,
        options: ListingOptions,
    ) -> Self {
        Self {
            store,
            reducer,
            matcher,
            options,
        }
    }

    pub fn reducer(&self) -> &StatusReducer {
        &self.reducer
    }

    pub fn matcher(&self) -> &ReleaseMatcher {
        &self.matcher
    }

    /// List every handover submitted for `release`, with its live status.
    ///
    /// # Errors
    ///
    /// - `InvalidRelease` if `release` is not decimal digits
    /// - `StoreUnavailable` if the scan or any reduction fails
    pub fn list_by_release(&self, release: &str) -> HandoverResult<ReleaseListing> {
        validate_release(release)?;

        let filter = EventFilter::new()
            .report_type(ReportType::Info)
            .starts_with(EventField::Message, self.reducer.options().submission_marker.as_str())
            .generation_suffix(EventField::TgtUri, release);
        let query = EventQuery::new(filter).with_limit(self.options.page_size);
        let candidates = self.store.query(&query)?;

        debug!(release = %release, candidates = candidates.len(), "submission events scanned");

        let mut seen = HashSet::new();
        let mut views = Vec::with_capacity(candidates.len());

        for submission in candidates {
            let params = submission.record.params();
            if !self.matcher.matches(&params.src_uri, release) {
                debug!(
                    release = %release,
                    src_uri = %params.src_uri,
                    "source does not belong to release; skipped"
                );
                continue;
            }
            if self.options.deduplicate_tokens && !seen.insert(params.handover_token.clone()) {
                continue;
            }

            match self.reducer.reduce(&params.handover_token) {
                Ok(live) => views.push(merge(&submission, live)),
                // Purged between the scan and the reduction.
                Err(HandoverError::NotFound { .. }) => {
                    debug!(token = %params.handover_token, "token vanished during listing; skipped");
                }
                Err(e) => return Err(e),
            }
        }

        info!(release = %release, handovers = views.len(), "release listing assembled");

        Ok(ReleaseListing {
            release: release.to_string(),
            views: views.into_iter(),
        })
    }
}

/// Submission-time identity combined with the reducer's live state.
fn merge(submission: &StoredEvent, live: StatusView) -> StatusView {
    let params = submission.record.params();
    StatusView {
        id: submission.id.clone(),
        handover_token: params.handover_token.clone(),
        status: live.status,
        current_message: live.current_message,
        comment: params.comment.clone(),
        contact: params.contact.clone(),
        src_uri: params.src_uri.clone(),
        tgt_uri: params.tgt_uri.clone(),
        report_time: submission.record.report_time(),
        progress_complete: live.progress_complete,
        progress_total: live.progress_total,
        submission_message: Some(submission.record.message().to_string()),
    }
}
