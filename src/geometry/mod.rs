pub mod shape_kind;
pub mod vertex;

pub use shape_kind::{ShapeKind, Topology};
pub use vertex::Vertex;
