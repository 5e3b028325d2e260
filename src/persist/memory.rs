use std::time::{SystemTime, UNIX_EPOCH};

use slotmap::{new_key_type, Key, KeyData, SlotMap};

use super::{PersistedShape, ShapeDraft, ShapeId, ShapeStore};
use crate::error::StorageError;

new_key_type! {
    struct SlotId;
}

fn shape_id(key: SlotId) -> ShapeId {
    ShapeId(key.data().as_ffi())
}

fn slot_id(id: ShapeId) -> SlotId {
    KeyData::from_ffi(id.0).into()
}

/// Process-local [`ShapeStore`] backed by a generational arena.
///
/// Ids of deleted shapes never resolve again, even after their slot is reused.
#[derive(Debug, Default)]
pub struct InMemoryShapeStore {
    shapes: SlotMap<SlotId, PersistedShape>,
}

impl InMemoryShapeStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Iterates over stored shapes of the given kind.
    pub fn shapes_of_kind<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a PersistedShape> {
        self.shapes.values().filter(move |s| s.kind == kind)
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

impl ShapeStore for InMemoryShapeStore {
    fn load_shape(&self, id: ShapeId) -> Result<PersistedShape, StorageError> {
        self.shapes
            .get(slot_id(id))
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    fn save_shape(&mut self, draft: ShapeDraft) -> Result<PersistedShape, StorageError> {
        if draft.vertices.is_empty() {
            return Err(StorageError::Rejected("shape has no vertices".into()));
        }
        let now = now_secs();
        let mut metadata = draft.metadata;
        metadata.updated_at = Some(now);

        match draft.id {
            Some(id) => {
                let slot = self
                    .shapes
                    .get_mut(slot_id(id))
                    .ok_or(StorageError::NotFound(id))?;
                metadata.created_at = slot.metadata.created_at.or(Some(now));
                slot.kind = draft.kind;
                slot.vertices = draft.vertices;
                slot.metadata = metadata;
                tracing::debug!(%id, "shape updated");
                Ok(slot.clone())
            }
            None => {
                metadata.created_at = Some(now);
                let key = self.shapes.insert_with_key(|key| PersistedShape {
                    id: shape_id(key),
                    kind: draft.kind,
                    vertices: draft.vertices,
                    metadata,
                });
                let shape = self
                    .shapes
                    .get(key)
                    .cloned()
                    .ok_or_else(|| StorageError::Unavailable("inserted shape vanished".into()))?;
                tracing::debug!(id = %shape.id, "shape inserted");
                Ok(shape)
            }
        }
    }

    fn delete_shape(&mut self, id: ShapeId) -> Result<(), StorageError> {
        self.shapes
            .remove(slot_id(id))
            .map(|_| tracing::debug!(%id, "shape deleted"))
            .ok_or(StorageError::NotFound(id))
    }
}
