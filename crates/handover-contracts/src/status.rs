//! Reduced job status as reported to callers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::EventId;

/// Human-meaningful lifecycle state of a handover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandoverStatus {
    /// Submitted; no worker has reported yet.
    Pending,
    Running,
    Complete,
    /// An ERROR event exists. Terminal, and wins over any INFO event.
    Failed,
}

impl HandoverStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

impl fmt::Display for HandoverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The current state of one handover.
///
/// Returned by the status reducer for a single token, and by the release
/// listing, where `id`, `report_time` and `submission_message` describe the
/// submission event while `status`, `current_message` and progress are live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusView {
    /// Store id of the event this view is anchored on.
    pub id: EventId,
    pub handover_token: String,
    pub status: HandoverStatus,
    pub current_message: String,
    pub comment: String,
    pub contact: String,
    pub src_uri: String,
    pub tgt_uri: String,
    pub report_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_complete: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_message: Option<String>,
}
