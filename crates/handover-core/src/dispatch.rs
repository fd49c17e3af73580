//! Event dispatch: route a domain event to the processes registered for it.
//!
//! Two lookup tables are injected at construction: event type → process
//! names, and process name → Job Queue analysis. Every process of the event
//! type is resolved before anything is enqueued, so an unknown process
//! rejects the whole event.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, info};

use handover_contracts::{
    error::{HandoverError, HandoverResult},
    job::{DispatchReceipt, ProcessJob},
};

use crate::traits::JobQueue;

pub struct EventDispatcher {
    queue: Arc<dyn JobQueue>,
    events: BTreeMap<String, Vec<String>>,
    processes: BTreeMap<String, String>,
}

impl EventDispatcher {
    /// `events` maps event type → processes; `processes` maps process →
    /// analysis.
    pub fn new(
        queue: Arc<dyn JobQueue>,
        events: BTreeMap<String, Vec<String>>,
        processes: BTreeMap<String, String>,
    ) -> Self {
        Self {
            queue,
            events,
            processes,
        }
    }

    /// Known event types, sorted.
    pub fn event_types(&self) -> Vec<&str> {
        self.events.keys().map(String::as_str).collect()
    }

    /// Known processes, sorted.
    pub fn processes(&self) -> Vec<&str> {
        self.processes.keys().map(String::as_str).collect()
    }

    /// Analysis that runs `process`.
    pub fn analysis_for(&self, process: &str) -> HandoverResult<&str> {
        self.processes
            .get(process)
            .map(String::as_str)
            .ok_or_else(|| HandoverError::not_found("process", process))
    }

    /// Enqueue one job per process registered for `event["type"]`.
    ///
    /// Each job's payload is `{"event": <event>}`.
    pub fn dispatch(&self, event: Value) -> HandoverResult<DispatchReceipt> {
        let event_type = event
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| HandoverError::Validation {
                reason: "event has no string 'type' field".to_string(),
            })?;

        let process_names = self
            .events
            .get(event_type)
            .ok_or_else(|| HandoverError::not_found("event type", event_type))?;

        let targets = process_names
            .iter()
            .map(|process| {
                self.analysis_for(process)
                    .map(|analysis| (process.as_str(), analysis))
            })
            .collect::<HandoverResult<Vec<_>>>()?;

        let payload = json!({ "event": event });
        let mut jobs = Vec::with_capacity(targets.len());
        for (process, analysis) in targets {
            debug!(event_type = %event_type, process = %process, analysis = %analysis, "submitting process");
            let handle = self.queue.submit(analysis, payload.clone())?;
            jobs.push(ProcessJob {
                process: process.to_string(),
                job: handle.id,
            });
        }

        info!(event_type = %event_type, jobs = jobs.len(), "event dispatched");

        Ok(DispatchReceipt {
            event,
            processes: jobs,
        })
    }
}
