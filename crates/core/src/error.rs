//! Error taxonomy for the vector store.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the index, the metadata store, and the services on top of them.
///
/// Client-facing validation errors (`DimensionMismatch`, `MissingField`,
/// `InvalidEmbedding`, `InvalidMetadata`) are always raised before any state
/// is touched. `InvariantViolation` means the two stores disagree and is never
/// recoverable by the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Vector length does not match the store dimension.
    #[error("Invalid embedding size: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimension fixed at store construction.
        expected: usize,
        /// Length of the rejected vector.
        got: usize,
    },

    /// Store dimension outside `1..=MAX_DIMENSION`.
    #[error("Invalid dimension {got}: must be 1-{max}")]
    InvalidDimension {
        /// Rejected dimension.
        got: usize,
        /// Upper bound from configuration.
        max: usize,
    },

    /// A required request field was absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// External id already registered in the metadata store.
    #[error("Duplicate vector id: {0}")]
    DuplicateId(Uuid),

    /// Lookup by position or external id missed.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A position exists in one store but not the other.
    #[error("Store invariant violated: {0}")]
    InvariantViolation(String),

    /// Embedding contains NaN or infinite components.
    #[error("Invalid embedding: {0}")]
    InvalidEmbedding(String),

    /// Metadata exceeds configured limits.
    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Free text for the encoder is unusable.
    #[error("Invalid text: {0}")]
    InvalidText(String),

    /// The external text encoder failed or returned garbage.
    #[error("Encoder error: {0}")]
    Encoder(String),
}

/// Result alias used throughout the core crate.
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// True for errors caused by bad caller input, as opposed to internal faults.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            StoreError::DimensionMismatch { .. }
                | StoreError::MissingField(_)
                | StoreError::InvalidEmbedding(_)
                | StoreError::InvalidMetadata(_)
                | StoreError::InvalidText(_)
        )
    }
}
