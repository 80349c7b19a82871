//! Error types for the editing engine.
//!
//! This module provides structured error types for vertex storage, the
//! draw/edit state machines, undo/redo handling and the persistence
//! collaborator.

use fieldkit_core::{GeometryError, UnitsError};
use thiserror::Error;

use crate::model::FieldId;

/// Errors that can occur during drawing and editing operations.
///
/// Every variant is recoverable: the engine leaves its state unchanged when it
/// returns one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A polygon or path was closed with too few vertices.
    #[error("At least {required} vertices are required, found {actual}")]
    InsufficientVertices { required: usize, actual: usize },

    /// A vertex index was outside the valid range.
    #[error("Vertex index {index} out of range (length: {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// A second drawing or editing session was requested while one is active.
    #[error("Another {active} session is already active")]
    ConcurrentSessionConflict { active: &'static str },

    /// The operation needs an active session of the given kind.
    #[error("No active {expected} session")]
    NoActiveSession { expected: &'static str },

    /// The field id is not registered.
    #[error("Unknown field: {0}")]
    UnknownField(FieldId),

    /// A drag gesture is in progress and must end first.
    #[error("A drag gesture is in progress")]
    GestureInProgress,

    /// No drag gesture is in progress.
    #[error("No drag gesture in progress")]
    NoGesture,

    /// An edge length was negative or not a number.
    #[error("Invalid edge length: {0}")]
    InvalidLength(String),

    /// An undo/redo operation failed.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// A geometry computation failed.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

impl From<UnitsError> for EngineError {
    fn from(err: UnitsError) -> Self {
        EngineError::InvalidLength(err.to_string())
    }
}

/// Errors returned by the undo/redo stack.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryError {
    /// The undo stack is empty.
    #[error("Nothing to undo")]
    NothingToUndo,

    /// The redo stack is empty.
    #[error("Nothing to redo")]
    NothingToRedo,
}

/// Errors surfaced by a persistence collaborator.
///
/// The host decides whether to retry or fall back to a local cache.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error while reading or writing the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored document could not be (de)serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The field does not exist in the store.
    #[error("Field {0} not found in store")]
    NotFound(FieldId),

    /// The backend rejected the request.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Returns true when retrying the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Io(_) | StoreError::Backend(_))
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;
