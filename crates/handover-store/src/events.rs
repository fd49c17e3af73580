//! In-memory implementation of `EventStore`.
//!
//! `InMemoryEventStore` keeps every event in a `Vec` behind a `Mutex`,
//! stamped with an id and an arrival sequence. Clones share the same
//! events, so one store can back the reducer, the listing service and the
//! submission service at once.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use handover_contracts::{
    error::{HandoverError, HandoverResult},
    event::{EventId, EventRecord, StoredEvent},
    query::{EventFilter, EventQuery},
};
use handover_core::traits::EventStore;

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct EventState {
    /// Events in arrival order.
    pub(crate) events: Vec<StoredEvent>,
    /// Sequence assigned to the next appended event.
    pub(crate) sequence: u64,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory event store.
#[derive(Clone)]
pub struct InMemoryEventStore {
    state: Arc<Mutex<EventState>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(EventState {
                events: Vec::new(),
                sequence: 0,
            })),
        }
    }

    /// Append each record in order, returning the ids assigned.
    pub fn extend<I>(&self, records: I) -> HandoverResult<Vec<EventId>>
    where
        I: IntoIterator<Item = EventRecord>,
    {
        records.into_iter().map(|record| self.append(record)).collect()
    }

    pub fn len(&self) -> HandoverResult<usize> {
        Ok(self.lock()?.events.len())
    }

    pub fn is_empty(&self) -> HandoverResult<bool> {
        Ok(self.lock()?.events.is_empty())
    }

    fn lock(&self) -> HandoverResult<MutexGuard<'_, EventState>> {
        self.state.lock().map_err(|e| HandoverError::StoreUnavailable {
            reason: format!("event store lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new()
    }
}

// ── EventStore impl ───────────────────────────────────────────────────────────

impl EventStore for InMemoryEventStore {
    fn append(&self, record: EventRecord) -> HandoverResult<EventId> {
        let mut state = self.lock()?;
        let id = EventId::new();
        let sequence = state.sequence;

        debug!(
            id = %id,
            sequence,
            token = %record.token(),
            report_type = %record.report_type(),
            "event appended"
        );

        state.events.push(StoredEvent {
            id: id.clone(),
            sequence,
            record,
        });
        state.sequence += 1;
        Ok(id)
    }

    fn query(&self, query: &EventQuery) -> HandoverResult<Vec<StoredEvent>> {
        let state = self.lock()?;
        Ok(query.apply(state.events.iter()))
    }

    /// Delete every event matching `filter`.
    ///
    /// An empty filter would match everything and is refused with
    /// `Validation`.
    fn delete_by_filter(&self, filter: &EventFilter) -> HandoverResult<usize> {
        if filter.is_empty() {
            return Err(HandoverError::Validation {
                reason: "refusing to delete with an empty filter".to_string(),
            });
        }

        let mut state = self.lock()?;
        let before = state.events.len();
        state.events.retain(|event| !filter.matches(&event.record));
        let removed = before - state.events.len();

        info!(removed, remaining = state.events.len(), "events deleted");
        Ok(removed)
    }
}
