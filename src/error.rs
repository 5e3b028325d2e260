use thiserror::Error;

use crate::persist::ShapeId;
use crate::validate::Crossing;

/// Top-level error type for the geoedit crate.
#[derive(Debug, Error)]
pub enum GeoeditError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A shape that cannot be committed in its current form.
///
/// These are expected outcomes: the session is left untouched and the user
/// may keep editing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("shape needs at least {required} vertices, has {actual}")]
    TooFewVertices { required: usize, actual: usize },

    #[error("shape boundary intersects itself ({} crossing edge pairs)", .crossings.len())]
    SelfIntersecting { crossings: Vec<Crossing> },

    #[error("required field is missing: {0}")]
    MissingRequiredField(String),
}

/// A command issued in a state that does not accept it.
///
/// These indicate a bug in the host UI wiring, not a user-facing condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no shape is being edited")]
    NotEditing,

    #[error("a shape is already being edited")]
    AlreadyEditing,

    #[error("a vertex drag is in progress")]
    DragInProgress,

    #[error("no vertex drag is in progress")]
    NoActiveDrag,

    #[error("a commit is in flight")]
    CommitInFlight,

    #[error("vertex index {index} is out of range for {len} vertices")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("there is no vertex to remove")]
    NothingToRemove,

    #[error("history action does not apply to the current vertices")]
    HistoryOutOfSync,

    #[error("shape belongs to a different kind than this session")]
    KindMismatch,

    #[error("vertex coordinates must be finite")]
    NonFiniteVertex,
}

/// Errors reported by a [`crate::persist::ShapeStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("shape not found: {0}")]
    NotFound(ShapeId),

    #[error("store rejected the shape: {0}")]
    Rejected(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by a [`crate::persist::Geocoder`]. Never fatal to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("no address found at this location")]
    NoResult,

    #[error("reverse geocoding failed: {0}")]
    Failed(String),
}

/// Errors returned by a commit attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors related to editor configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse editor config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid editor config: {0}")]
    Invalid(String),
}

impl From<CommitError> for GeoeditError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Validation(e) => Self::Validation(e),
            CommitError::Session(e) => Self::Session(e),
            CommitError::Storage(e) => Self::Storage(e),
        }
    }
}

/// Convenience type alias for results using [`GeoeditError`].
pub type Result<T> = std::result::Result<T, GeoeditError>;
