//! # handover-store
//!
//! In-memory collaborators for the handover status service.
//!
//! ## Overview
//!
//! [`InMemoryEventStore`] implements
//! [`EventStore`](handover_core::traits::EventStore) and
//! [`InMemoryJobQueue`] implements [`JobQueue`](handover_core::traits::JobQueue).
//! Both keep their state behind a `Mutex`, clone cheaply, and share state
//! between clones. A poisoned lock surfaces as `StoreUnavailable` or
//! `QueueUnavailable`, never as a panic.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use handover_store::{InMemoryEventStore, InMemoryJobQueue};
//!
//! let store = Arc::new(InMemoryEventStore::new());
//! let reducer = StatusReducer::new(store.clone(), ReducerOptions::default());
//! ```

pub mod events;
pub mod queue;

pub use events::InMemoryEventStore;
pub use queue::InMemoryJobQueue;

// ── Tests ─────────────────────────────────────────────────────────────────────
