pub mod config;
pub mod edit;
pub mod error;
pub mod geometry;
pub mod math;
pub mod persist;
pub mod validate;

pub use config::EditorConfig;
pub use edit::{Action, EditSession, History, SessionState};
pub use error::{
    CommitError, ConfigError, GeocodeError, GeoeditError, Result, SessionError, StorageError,
    ValidationError,
};
pub use geometry::{ShapeKind, Topology, Vertex};
pub use persist::{
    CommitRequest, CommitTicket, Geocoder, InMemoryShapeStore, NoGeocoder, PersistedShape,
    ShapeDraft, ShapeId, ShapeMetadata, ShapeStore,
};
pub use validate::{find_crossings, is_simple, Crossing};
