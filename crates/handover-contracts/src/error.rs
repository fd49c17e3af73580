//! Error taxonomy for the handover status service.
//!
//! Every fallible operation returns `HandoverResult<T>`. Variants keep the
//! failure kind intact all the way to the caller, so "unknown token" and
//! "store unreachable" are never confused with an empty success.

use thiserror::Error;

/// The unified error type for the handover crates.
#[derive(Debug, Error)]
pub enum HandoverError {
    /// An event record or request was malformed and must not be stored.
    #[error("validation error: {reason}")]
    Validation { reason: String },

    /// The token argument was empty or otherwise unusable as a lookup key.
    #[error("invalid handover token: {reason}")]
    InvalidToken { reason: String },

    /// The token has no events, or the job id is unknown to the queue.
    #[error("{what} not found")]
    NotFound { what: String },

    /// The Event Store could not be reached or answered with a transport error.
    ///
    /// Retriable by the caller. Nothing inside the service retries.
    #[error("event store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// The Job Queue could not be reached or answered with a transport error.
    #[error("job queue unavailable: {reason}")]
    QueueUnavailable { reason: String },

    /// A report format was requested that the service does not produce.
    #[error("unsupported report format: {reason}")]
    Format { reason: String },

    /// The release argument is not a decimal generation number.
    #[error("invalid release '{release}': expected decimal digits")]
    InvalidRelease { release: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },
}

impl HandoverError {
    /// Shorthand for the common "<kind> <key> not found" case.
    pub fn not_found(kind: &str, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what: format!("{kind} {key}"),
        }
    }

    /// True for transport-level failures a caller may retry as-is.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::QueueUnavailable { .. }
        )
    }
}

/// Convenience alias used throughout the handover crates.
pub type HandoverResult<T> = Result<T, HandoverError>;
