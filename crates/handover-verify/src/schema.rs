//! Schema-based validation of handover submission requests.
//!
//! `SchemaValidator` implements the `SubmissionValidator` trait from
//! `handover-core`. Validation runs in two phases:
//!
//! 1. **Structural**: the request body is validated against a JSON Schema
//!    document using the `jsonschema` crate.
//! 2. **Semantic**: each registered check runs against the body.
//!
//! All failures are collected and reported together in one `Validation`
//! error, so a submitter sees every problem in one round trip.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::{debug, warn};

use handover_contracts::error::{HandoverError, HandoverResult};
use handover_core::traits::SubmissionValidator;

/// A caller-supplied check. Returns `Some(message)` on failure.
pub type CustomCheckFn = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// JSON Schema for a handover request: `src_uri`, `contact` and `comment`
/// are required non-empty strings; `tgt_uri` is an optional string.
pub fn handover_request_schema() -> Value {
    json!({
        "title": "handover job",
        "type": "object",
        "required": ["src_uri", "contact", "comment"],
        "properties": {
            "src_uri": { "type": "string", "minLength": 1 },
            "contact": { "type": "string", "minLength": 1 },
            "comment": { "type": "string", "minLength": 1 },
            "tgt_uri": { "type": "string" }
        }
    })
}

/// Validates request bodies against a compiled JSON Schema plus named checks.
pub struct SchemaValidator {
    schema: jsonschema::Validator,
    checks: BTreeMap<String, CustomCheckFn>,
}

impl SchemaValidator {
    /// Compile `schema`. A malformed schema document is a `Config` error.
    pub fn new(schema: &Value) -> HandoverResult<Self> {
        let schema = jsonschema::validator_for(schema).map_err(|e| HandoverError::Config {
            reason: format!("invalid JSON Schema document: {e}"),
        })?;
        Ok(Self {
            schema,
            checks: BTreeMap::new(),
        })
    }

    /// The validator for handover submissions, with the database-name check
    /// registered.
    pub fn for_handover() -> HandoverResult<Self> {
        let mut validator = Self::new(&handover_request_schema())?;
        validator.register_check("src-uri-database", Box::new(src_uri_names_database));
        Ok(validator)
    }

    /// Register a named check. Registering the same name twice replaces the
    /// earlier check. Checks run in name order.
    pub fn register_check(&mut self, name: impl Into<String>, check: CustomCheckFn) {
        self.checks.insert(name.into(), check);
    }

    /// Every failure message for `request`, structural ones first.
    pub fn failures(&self, request: &Value) -> Vec<String> {
        let mut failures: Vec<String> = self
            .schema
            .iter_errors(request)
            .map(|error| format!("at '{}': {}", error.instance_path, error))
            .collect();

        // Semantic checks assume the structure is sound.
        if failures.is_empty() {
            for (name, check) in &self.checks {
                debug!(check = %name, "running submission check");
                if let Some(message) = check(request) {
                    failures.push(format!("{name}: {message}"));
                }
            }
        }
        failures
    }
}

impl SubmissionValidator for SchemaValidator {
    fn validate(&self, request: &Value) -> HandoverResult<()> {
        let failures = self.failures(request);
        if failures.is_empty() {
            return Ok(());
        }
        warn!(failures = failures.len(), "handover request rejected");
        Err(HandoverError::Validation {
            reason: format!("handover request invalid: {}", failures.join("; ")),
        })
    }
}

/// `src_uri` must end in a database name, which the target is derived from.
fn src_uri_names_database(request: &Value) -> Option<String> {
    let src_uri = request.get("src_uri").and_then(Value::as_str)?;
    match src_uri.rsplit_once('/') {
        Some((_, name)) if !name.is_empty() => None,
        _ => Some(format!("'{src_uri}' does not end in a database name")),
    }
}
