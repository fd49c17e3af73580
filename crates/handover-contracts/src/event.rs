//! Event documents written by handover workers.
//!
//! Workers append one `EventRecord` per progress report. Records are never
//! mutated once stored; the store wraps each one in a `StoredEvent` carrying
//! its opaque id and arrival sequence.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HandoverError, HandoverResult};

/// Naive timestamp layout used by the pipeline workers, read as UTC.
const NAIVE_REPORT_TIME: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Severity of an event document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReportType {
    Info,
    Error,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = HandoverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(Self::Info),
            "ERROR" => Ok(Self::Error),
            other => Err(HandoverError::Validation {
                reason: format!("report_type must be INFO or ERROR, got '{other}'"),
            }),
        }
    }
}

/// Parse a writer-supplied `report_time`.
///
/// Accepts RFC 3339 (`2018-06-27T15:19:08.459Z`) and the zone-less form the
/// pipeline emits (`2018-06-27T15:19:08.459`), which is taken as UTC.
pub fn parse_report_time(s: &str) -> HandoverResult<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, NAIVE_REPORT_TIME)
        .map(|t| t.and_utc())
        .map_err(|e| HandoverError::Validation {
            reason: format!("report_time '{s}' is not a timestamp: {e}"),
        })
}

/// Structured payload attached to every event.
///
/// `handover_token` ties the event to exactly one job. The progress counters
/// are only present on reports from steps that track them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParams {
    pub handover_token: String,
    pub src_uri: String,
    pub tgt_uri: String,
    pub contact: String,
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_complete: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_total: Option<u64>,
}

impl EventParams {
    /// Attach progress counters, e.g. `with_progress(2, 3)`.
    pub fn with_progress(mut self, complete: u64, total: u64) -> Self {
        self.progress_complete = Some(complete);
        self.progress_total = Some(total);
        self
    }
}

/// An event exactly as a writer submitted it, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub report_type: String,
    pub report_time: String,
    pub message: String,
    pub params: EventParams,
}

/// A validated event document.
///
/// Only constructible through `EventRecord::new` or `TryFrom<RawEvent>`, so
/// anything handed to `EventStore::append` has already passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawEvent")]
pub struct EventRecord {
    report_type: ReportType,
    report_time: DateTime<Utc>,
    message: String,
    params: EventParams,
}

impl EventRecord {
    /// Build a record, rejecting an empty token or inverted progress counters.
    pub fn new(
        report_type: ReportType,
        report_time: DateTime<Utc>,
        message: impl Into<String>,
        params: EventParams,
    ) -> HandoverResult<Self> {
        if params.handover_token.trim().is_empty() {
            return Err(HandoverError::Validation {
                reason: "params.handover_token must not be empty".to_string(),
            });
        }
        if let (Some(complete), Some(total)) = (params.progress_complete, params.progress_total) {
            if complete > total {
                return Err(HandoverError::Validation {
                    reason: format!(
                        "progress_complete ({complete}) exceeds progress_total ({total})"
                    ),
                });
            }
        }
        Ok(Self {
            report_type,
            report_time,
            message: message.into(),
            params,
        })
    }

    pub fn report_type(&self) -> ReportType {
        self.report_type
    }

    pub fn report_time(&self) -> DateTime<Utc> {
        self.report_time
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn params(&self) -> &EventParams {
        &self.params
    }

    /// The job this event belongs to.
    pub fn token(&self) -> &str {
        &self.params.handover_token
    }
}

impl TryFrom<RawEvent> for EventRecord {
    type Error = HandoverError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let report_type = raw.report_type.parse()?;
        let report_time = parse_report_time(&raw.report_time)?;
        Self::new(report_type, report_time, raw.message, raw.params)
    }
}

/// Opaque identifier assigned by the Event Store. Never used for ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    /// A fresh random id, for stores that do not assign their own.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredEvent {
    pub id: EventId,
    /// Arrival position in the store; breaks `report_time` ties.
    pub sequence: u64,
    #[serde(flatten)]
    pub record: EventRecord,
}
