//! Contract between an editing session and the backing shape store.
//!
//! The store and the reverse geocoder are external services; this module only
//! defines what the editor needs from them and how a finished session is
//! turned into a saveable record.

mod memory;

pub use memory::InMemoryShapeStore;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GeocodeError, StorageError};
use crate::geometry::{Topology, Vertex};

/// Identifier of a persisted shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Descriptive fields stored alongside a shape's geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeMetadata {
    pub title: String,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Free-text fields specific to the shape kind (description, contractor, ...).
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
    /// Address derived from the shape's centroid. Filled in at commit time.
    #[serde(default)]
    pub address: Option<String>,
    /// Unix seconds, set by the store.
    #[serde(default)]
    pub created_at: Option<u64>,
    /// Unix seconds, set by the store.
    #[serde(default)]
    pub updated_at: Option<u64>,
}

impl ShapeMetadata {
    /// Creates metadata with only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the classification.
    #[must_use]
    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    /// Sets a free-text field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Value of a named field. `title` and `classification` map to the
    /// dedicated members; anything else is looked up in `fields`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(self.title.as_str()),
            "classification" => self.classification.as_deref(),
            other => self.fields.get(other).map(String::as_str),
        }
    }

    /// First of `required` whose value is absent or blank.
    #[must_use]
    pub fn first_missing<'a>(&self, required: &'a [String]) -> Option<&'a str> {
        required
            .iter()
            .map(String::as_str)
            .find(|name| self.field(name).is_none_or(|v| v.trim().is_empty()))
    }
}

/// A shape ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDraft {
    /// `None` inserts a new shape; `Some` updates an existing one.
    pub id: Option<ShapeId>,
    pub kind: String,
    /// Stored form: rings include the closing vertex.
    pub vertices: Vec<Vertex>,
    pub metadata: ShapeMetadata,
}

/// A shape as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedShape {
    pub id: ShapeId,
    pub kind: String,
    /// Stored form: rings include the closing vertex.
    pub vertices: Vec<Vertex>,
    pub metadata: ShapeMetadata,
}

/// Storage backend for committed shapes.
pub trait ShapeStore {
    /// Loads a shape by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown ids, or a backend error.
    fn load_shape(&self, id: ShapeId) -> Result<PersistedShape, StorageError>;

    /// Inserts (`draft.id == None`) or updates a shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects or cannot store the shape.
    fn save_shape(&mut self, draft: ShapeDraft) -> Result<PersistedShape, StorageError>;

    /// Deletes a committed shape.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] for unknown ids, or a backend error.
    fn delete_shape(&mut self, id: ShapeId) -> Result<(), StorageError>;
}

/// Coordinate-to-address lookup.
pub trait Geocoder {
    /// Returns a human-readable address near `at`.
    ///
    /// # Errors
    ///
    /// Returns an error if no address could be determined.
    fn reverse_geocode(&self, at: Vertex) -> Result<String, GeocodeError>;
}

/// A geocoder that never resolves, so every commit gets the placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

impl Geocoder for NoGeocoder {
    fn reverse_geocode(&self, _at: Vertex) -> Result<String, GeocodeError> {
        Err(GeocodeError::NoResult)
    }
}

/// Identifies one prepared commit of an [`crate::EditSession`].
///
/// Every call to `prepare_commit` issues a fresh ticket. Completing or aborting
/// with a ticket that is no longer in flight leaves the session alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitTicket(pub(crate) u64);

impl fmt::Display for CommitTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "commit {}", self.0)
    }
}

/// By-value snapshot of a validated session, taken when a commit starts.
///
/// Later edits to the session cannot affect a snapshot that is already being
/// saved.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    /// Hand back to `complete_commit` or `abort_commit` once the save settles.
    pub ticket: CommitTicket,
    pub target: Option<ShapeId>,
    pub kind: String,
    pub topology: Topology,
    pub default_color: Option<String>,
    /// Stored form: rings include the closing vertex.
    pub vertices: Vec<Vertex>,
    pub metadata: ShapeMetadata,
}

impl CommitRequest {
    /// Point used for reverse geocoding: centroid for rings, midpoint for paths.
    #[must_use]
    pub fn anchor(&self) -> Option<Vertex> {
        self.topology.anchor(&self.topology.open(&self.vertices))
    }

    /// Fills in derived metadata and produces the draft to save.
    ///
    /// A failed or empty geocode lookup is replaced by `placeholder`.
    #[must_use]
    pub fn enrich<G>(self, geocoder: &G, placeholder: &str) -> ShapeDraft
    where
        G: Geocoder + ?Sized,
    {
        let address = match self.anchor().map(|at| geocoder.reverse_geocode(at)) {
            Some(Ok(address)) if !address.trim().is_empty() => address,
            Some(Ok(_)) | None => placeholder.to_string(),
            Some(Err(err)) => {
                tracing::warn!(
                    error = %err,
                    kind = %self.kind,
                    "reverse geocoding failed, using placeholder"
                );
                placeholder.to_string()
            }
        };

        let mut metadata = self.metadata;
        metadata.address = Some(address);
        if metadata.color.is_none() {
            metadata.color = self.default_color;
        }

        ShapeDraft {
            id: self.target,
            kind: self.kind,
            vertices: self.vertices,
            metadata,
        }
    }

    /// Enriches and saves the snapshot.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged; nothing is retried.
    pub fn persist<S, G>(
        self,
        store: &mut S,
        geocoder: &G,
        placeholder: &str,
    ) -> Result<PersistedShape, StorageError>
    where
        S: ShapeStore + ?Sized,
        G: Geocoder + ?Sized,
    {
        let draft = self.enrich(geocoder, placeholder);
        store.save_shape(draft).inspect_err(|err| {
            tracing::warn!(error = %err, "saving shape failed");
        })
    }
}
