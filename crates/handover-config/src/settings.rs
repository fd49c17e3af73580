//! Configuration schema.
//!
//! A `HandoverConfig` is deserialized from TOML. Every section and every key
//! is optional; a missing key takes the default shown below.
//!
//! ```toml
//! release = "101"
//!
//! [status]
//! submission_marker = "Handling"
//! completion_markers = ["handover successful", "handover complete"]
//!
//! [listing]
//! page_size = 1000
//! deduplicate_tokens = false
//!
//! [matcher]
//! release_offset = 53
//!
//! [submission]
//! analysis = "handover_database"
//! target_server_uri = "mysql://ensadmin@mysql-ens-sta-1:4519/"
//!
//! [jobs]
//! analysis = "copy_database"
//!
//! [events]
//! new_assembly = ["xref_update"]
//!
//! [processes.xref_update]
//! analysis = "run_xrefs"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use handover_core::{
    ListingOptions, ReducerOptions, ReleaseMatcher, SubmissionOptions, DEFAULT_RELEASE_OFFSET,
};

/// Release listed when the caller names none.
pub const DEFAULT_RELEASE: &str = "101";

/// Root of the configuration document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandoverConfig {
    /// Default release for listings.
    pub release: String,
    pub status: StatusSection,
    pub listing: ListingSection,
    pub matcher: MatcherSection,
    pub submission: SubmissionSection,
    pub jobs: JobsSection,
    /// Event type → names of the processes it triggers.
    pub events: BTreeMap<String, Vec<String>>,
    /// Process name → how to run it.
    pub processes: BTreeMap<String, ProcessSection>,
}

impl Default for HandoverConfig {
    fn default() -> Self {
        Self {
            release: DEFAULT_RELEASE.to_string(),
            status: StatusSection::default(),
            listing: ListingSection::default(),
            matcher: MatcherSection::default(),
            submission: SubmissionSection::default(),
            jobs: JobsSection::default(),
            events: BTreeMap::new(),
            processes: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusSection {
    pub submission_marker: String,
    pub completion_markers: Vec<String>,
}

impl Default for StatusSection {
    fn default() -> Self {
        let defaults = ReducerOptions::default();
        Self {
            submission_marker: defaults.submission_marker,
            completion_markers: defaults.completion_markers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingSection {
    pub page_size: usize,
    pub deduplicate_tokens: bool,
}

impl Default for ListingSection {
    fn default() -> Self {
        let defaults = ListingOptions::default();
        Self {
            page_size: defaults.page_size,
            deduplicate_tokens: defaults.deduplicate_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatcherSection {
    /// Amount the secondary number runs ahead of the primary one.
    pub release_offset: u64,
}

impl Default for MatcherSection {
    fn default() -> Self {
        Self {
            release_offset: DEFAULT_RELEASE_OFFSET,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SubmissionSection {
    pub analysis: String,
    /// Empty means every request must carry its own `tgt_uri`.
    pub target_server_uri: String,
}

impl Default for SubmissionSection {
    fn default() -> Self {
        let defaults = SubmissionOptions::default();
        Self {
            analysis: defaults.analysis,
            target_server_uri: defaults.target_server_uri,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobsSection {
    pub analysis: String,
}

impl Default for JobsSection {
    fn default() -> Self {
        Self {
            analysis: "copy_database".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessSection {
    pub analysis: String,
}

// ── Service options ───────────────────────────────────────────────────────────

impl HandoverConfig {
    pub fn reducer_options(&self) -> ReducerOptions {
        ReducerOptions {
            submission_marker: self.status.submission_marker.clone(),
            completion_markers: self.status.completion_markers.clone(),
        }
    }

    pub fn listing_options(&self) -> ListingOptions {
        ListingOptions {
            page_size: self.listing.page_size,
            deduplicate_tokens: self.listing.deduplicate_tokens,
        }
    }

    pub fn matcher(&self) -> ReleaseMatcher {
        ReleaseMatcher::new(self.matcher.release_offset)
    }

    /// Submission options. The marker is shared with `[status]` so the
    /// listing finds the events the submitter writes.
    pub fn submission_options(&self) -> SubmissionOptions {
        SubmissionOptions {
            analysis: self.submission.analysis.clone(),
            target_server_uri: self.submission.target_server_uri.clone(),
            submission_marker: self.status.submission_marker.clone(),
        }
    }

    /// Process name → analysis, flattened from `[processes.*]`.
    pub fn process_analyses(&self) -> BTreeMap<String, String> {
        self.processes
            .iter()
            .map(|(name, process)| (name.clone(), process.analysis.clone()))
            .collect()
    }
}
