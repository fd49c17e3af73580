//! Event Store query language.
//!
//! A query is a conjunction of field conditions plus a `report_time` sort,
//! a limit and an offset. `EventQuery::apply` is the reference evaluation
//! used by in-process stores; remote adapters translate the same structure
//! into their native query syntax.

use serde::{Deserialize, Serialize};

use crate::event::{EventRecord, ReportType, StoredEvent};

/// A field of an event document that conditions can address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventField {
    HandoverToken,
    ReportType,
    Message,
    SrcUri,
    TgtUri,
    Contact,
    Comment,
}

impl EventField {
    /// Read this field from a record as text.
    pub fn value_of<'r>(&self, record: &'r EventRecord) -> &'r str {
        let params = record.params();
        match self {
            Self::HandoverToken => &params.handover_token,
            Self::ReportType => record.report_type().as_str(),
            Self::Message => record.message(),
            Self::SrcUri => &params.src_uri,
            Self::TgtUri => &params.tgt_uri,
            Self::Contact => &params.contact,
            Self::Comment => &params.comment,
        }
    }
}

/// One predicate over a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// Exact, case-sensitive equality.
    Equals { field: EventField, value: String },
    /// The field starts with `prefix`.
    StartsWith { field: EventField, prefix: String },
    /// The field ends in `_<generation>`, optionally followed by one more
    /// `_<digits>` group.
    GenerationSuffix { field: EventField, generation: String },
}

impl Condition {
    pub fn matches(&self, record: &EventRecord) -> bool {
        match self {
            Self::Equals { field, value } => field.value_of(record) == value,
            Self::StartsWith { field, prefix } => field.value_of(record).starts_with(prefix.as_str()),
            Self::GenerationSuffix { field, generation } => {
                has_generation_suffix(field.value_of(record), generation)
            }
        }
    }
}

fn has_generation_suffix(value: &str, generation: &str) -> bool {
    let mut groups = value.rsplit('_');
    let (Some(last), Some(before)) = (groups.next(), groups.next()) else {
        return false;
    };
    if last == generation {
        return true;
    }
    // `before` is only a group when a further `_` precedes it.
    let is_number = !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit());
    is_number && before == generation && groups.next().is_some()
}

/// A conjunction of conditions. The empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    conditions: Vec<Condition>,
}

impl EventFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events of one job.
    pub fn token(token: impl Into<String>) -> Self {
        Self::new().equals(EventField::HandoverToken, token)
    }

    pub fn equals(mut self, field: EventField, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Equals {
            field,
            value: value.into(),
        });
        self
    }

    pub fn starts_with(mut self, field: EventField, prefix: impl Into<String>) -> Self {
        self.conditions.push(Condition::StartsWith {
            field,
            prefix: prefix.into(),
        });
        self
    }

    pub fn generation_suffix(mut self, field: EventField, generation: impl Into<String>) -> Self {
        self.conditions.push(Condition::GenerationSuffix {
            field,
            generation: generation.into(),
        });
        self
    }

    pub fn report_type(self, report_type: ReportType) -> Self {
        self.equals(EventField::ReportType, report_type.as_str())
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, record: &EventRecord) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

/// Direction of the `report_time` sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// A complete store query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    pub filter: EventFilter,
    pub order: SortOrder,
    /// Maximum number of records returned; `None` means unbounded.
    pub limit: Option<usize>,
    /// Number of sorted records skipped before `limit` applies.
    pub offset: usize,
}

impl EventQuery {
    /// Newest first, unbounded.
    pub fn new(filter: EventFilter) -> Self {
        Self {
            filter,
            order: SortOrder::Descending,
            limit: None,
            offset: 0,
        }
    }

    /// The single most recent record matching `filter`.
    pub fn latest(filter: EventFilter) -> Self {
        Self::new(filter).with_limit(1)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Evaluate the query over a set of stored events.
    ///
    /// Ordering is by `report_time`, then by arrival `sequence`, so among
    /// equal timestamps the later arrival counts as the later event.
    pub fn apply<'a, I>(&self, events: I) -> Vec<StoredEvent>
    where
        I: IntoIterator<Item = &'a StoredEvent>,
    {
        let mut hits: Vec<&StoredEvent> = events
            .into_iter()
            .filter(|e| self.filter.matches(&e.record))
            .collect();

        hits.sort_by_key(|e| (e.record.report_time(), e.sequence));
        if self.order == SortOrder::Descending {
            hits.reverse();
        }

        hits.into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}
