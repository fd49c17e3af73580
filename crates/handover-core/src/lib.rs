//! # handover-core
//!
//! The status aggregation engine of the handover service.
//!
//! This crate provides:
//! - The collaborator traits (`EventStore`, `JobQueue`, `SubmissionValidator`)
//! - `StatusReducer`: current state of one handover from its event trail
//! - `ReleaseMatcher`: does a database identifier belong to a release
//! - `ListingService`: every handover of a release, with live status
//! - `HandoverService`, `JobService`, `EventDispatcher`: the write side
//!
//! Nothing here holds shared mutable state. All collaborators and lookup
//! tables are passed in at construction.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use handover_core::{ListingService, ReleaseMatcher, StatusReducer};
//!
//! let reducer = StatusReducer::new(store.clone(), ReducerOptions::default());
//! let view = reducer.reduce(&token)?;
//! ```

pub mod dispatch;
pub mod handover;
pub mod jobs;
pub mod listing;
pub mod reducer;
pub mod release;
pub mod traits;

pub use dispatch::EventDispatcher;
pub use handover::{HandoverService, SubmissionOptions};
pub use jobs::{JobReport, JobService, ReportFormat};
pub use listing::{ListingOptions, ListingService, ReleaseListing};
pub use reducer::{ReducerOptions, StatusReducer};
pub use release::{ReleaseMatcher, DEFAULT_RELEASE_OFFSET};
