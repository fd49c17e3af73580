//! # handover-verify
//!
//! Request validation for the handover service.
//!
//! This crate provides [`schema::SchemaValidator`], which implements the
//! [`handover_core::traits::SubmissionValidator`] trait. It validates request
//! bodies in two phases:
//!
//! 1. **Structural**: JSON Schema validation via the `jsonschema` crate.
//! 2. **Semantic**: named checks registered by the hosting application.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use handover_verify::SchemaValidator;
//!
//! let validator = SchemaValidator::for_handover()?;
//! validator.validate(&body)?;
//! ```

pub mod schema;

pub use schema::{handover_request_schema, CustomCheckFn, SchemaValidator};

// ── Tests ─────────────────────────────────────────────────────────────────────
