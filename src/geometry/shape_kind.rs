use serde::{Deserialize, Serialize};

use super::vertex::{to_points, Vertex};
use crate::math::polygon_2d::{path_midpoint_2d, polygon_centroid_2d};

/// Whether a shape's boundary closes back on itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Closed polygon boundary. The closing vertex is not stored while editing.
    Ring,
    /// Open polyline.
    Path,
}

impl Topology {
    /// Smallest vertex count that can form this topology.
    #[must_use]
    pub fn floor(self) -> usize {
        match self {
            Self::Ring => 3,
            Self::Path => 2,
        }
    }

    /// Produces the stored form of an editable vertex list.
    ///
    /// Rings get their first vertex appended; paths are returned as-is.
    #[must_use]
    pub fn close(self, vertices: &[Vertex]) -> Vec<Vertex> {
        let mut closed = Vec::with_capacity(vertices.len() + 1);
        closed.extend_from_slice(vertices);
        if let (Self::Ring, Some(&first)) = (self, vertices.first()) {
            closed.push(first);
        }
        closed
    }

    /// Inverse of [`Topology::close`]: strips a trailing vertex equal to the first.
    #[must_use]
    pub fn open(self, vertices: &[Vertex]) -> Vec<Vertex> {
        match (self, vertices) {
            (Self::Ring, [first, .., last]) if first == last => {
                vertices[..vertices.len() - 1].to_vec()
            }
            _ => vertices.to_vec(),
        }
    }

    /// Anchor point of an open vertex list: the area centroid for rings, the
    /// along-length midpoint for paths.
    #[must_use]
    pub fn anchor(self, vertices: &[Vertex]) -> Option<Vertex> {
        let points = to_points(vertices);
        let p = match self {
            Self::Ring => polygon_centroid_2d(&points),
            Self::Path => path_midpoint_2d(&points),
        }?;
        Some(Vertex::from_point(p))
    }
}

/// Per-kind editing rules shared by every map editor.
///
/// Project areas, roads and zones differ only in the values held here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeKind {
    pub name: String,
    pub topology: Topology,
    #[serde(default)]
    pub min_vertices: usize,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub default_color: Option<String>,
}

impl ShapeKind {
    /// Creates a kind with no required fields and the topology's minimum.
    #[must_use]
    pub fn new(name: impl Into<String>, topology: Topology) -> Self {
        Self {
            name: name.into(),
            topology,
            min_vertices: topology.floor(),
            required_fields: Vec::new(),
            default_color: None,
        }
    }

    /// Sets the minimum vertex count. Values below the topology floor are ignored.
    #[must_use]
    pub fn with_min_vertices(mut self, min: usize) -> Self {
        self.min_vertices = min;
        self
    }

    /// Adds a metadata field that must be non-blank at commit time.
    #[must_use]
    pub fn require(mut self, field: impl Into<String>) -> Self {
        self.required_fields.push(field.into());
        self
    }

    /// Sets the display color applied at commit time when the metadata has no color.
    #[must_use]
    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = Some(color.into());
        self
    }

    /// Effective minimum vertex count for committing.
    #[must_use]
    pub fn required_vertices(&self) -> usize {
        self.min_vertices.max(self.topology.floor())
    }

    /// Project boundary polygons.
    #[must_use]
    pub fn project_area() -> Self {
        Self::new("project_area", Topology::Ring)
            .require("title")
            .with_default_color("#3388ff")
    }

    /// Road centre lines.
    #[must_use]
    pub fn road() -> Self {
        Self::new("road", Topology::Path)
            .require("title")
            .with_default_color("#ff7800")
    }

    /// Land-use zone polygons.
    #[must_use]
    pub fn zone() -> Self {
        Self::new("zone", Topology::Ring)
            .require("title")
            .require("classification")
    }
}
