//! Error types for temporal indexing and change observation.
//!
//! Every failure here is a contract violation detected synchronously at the
//! call that observed it. Nothing is transient, so nothing is retried.

use thiserror::Error;

/// Errors raised by the dictionary, its indices, value sets and observers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimegraphError {
    /// A timestamp was NaN or infinite.
    #[error("timestamp can't be NaN or infinity (got {0})")]
    InvalidTimestamp(f64),

    /// A value, timestamp or slot expected to be present was absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// A slot id fell outside the allocated slot range.
    #[error("slot {index} is out of bounds (allocated length {length})")]
    IndexOutOfBounds { index: usize, length: usize },

    /// The call was structurally invalid (main-view index deletion, absent
    /// value, mismatched value type, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `get_diff` was called on an observer built without diff tracking.
    #[error("this observer doesn't compute diffs, enable diff tracking when creating it")]
    DiffTrackingDisabled,

    /// `get_diff` was called without a preceding change-detecting `has_changed`.
    #[error("has_changed() must report a change before get_diff(), and get_diff() may only be called once per change")]
    StaleObserverProtocol,

    /// The observer has already been destroyed.
    #[error("this observer has already been destroyed")]
    ObserverDestroyed,

    /// Temporal indexing is switched off in the dictionary configuration.
    #[error("timestamp indexing is disabled by configuration")]
    IndexingDisabled,

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TimegraphError {
    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, TimegraphError>;
