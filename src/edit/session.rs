use tracing::{debug, info, warn};

use super::history::{Action, History};
use crate::error::{CommitError, SessionError, ValidationError};
use crate::geometry::{ShapeKind, Topology, Vertex};
use crate::persist::{
    CommitRequest, CommitTicket, Geocoder, PersistedShape, ShapeId, ShapeMetadata, ShapeStore,
};
use crate::validate::find_crossings;

/// Where an [`EditSession`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionState {
    /// No shape is being edited.
    Idle,
    /// Accepting add, drag, remove and history commands.
    Editing,
    /// A vertex is being relocated. Only drag updates and drag end are accepted.
    Dragging { index: usize, start: Vertex },
    /// A validated snapshot is being saved. All mutations are refused until
    /// the commit holding `ticket` completes or is aborted.
    Committing { ticket: CommitTicket },
}

/// Editing context for a single polygon or polyline.
///
/// The session owns the working vertex list (rings are kept open; the closing
/// vertex is added only when committing), the undo/redo history and the
/// metadata draft. Every command either succeeds or returns an error without
/// touching state.
#[derive(Debug, Clone)]
pub struct EditSession {
    kind: ShapeKind,
    state: SessionState,
    vertices: Vec<Vertex>,
    history: History,
    target: Option<ShapeId>,
    metadata: ShapeMetadata,
    next_ticket: u64,
}

impl EditSession {
    /// Creates an idle session for shapes of `kind`.
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            state: SessionState::Idle,
            vertices: Vec::new(),
            history: History::new(),
            target: None,
            metadata: ShapeMetadata::default(),
            next_ticket: 0,
        }
    }

    // --- Inspection ---

    #[must_use]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The working vertices, without the ring's closing vertex.
    #[must_use]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Id of the persisted shape being edited, if any.
    #[must_use]
    pub fn target(&self) -> Option<ShapeId> {
        self.target
    }

    #[must_use]
    pub fn metadata(&self) -> &ShapeMetadata {
        &self.metadata
    }

    /// Metadata draft that the host form writes into. Not tracked by history.
    pub fn metadata_mut(&mut self) -> &mut ShapeMetadata {
        &mut self.metadata
    }

    /// Whether any undoable change has been made since the session began.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.history.can_undo()
    }

    // --- Lifecycle ---

    /// Starts drawing a new shape.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is idle.
    pub fn begin_new(&mut self) -> Result<(), SessionError> {
        self.begin(Vec::new(), None, ShapeMetadata::default())
    }

    /// Starts editing an existing vertex list.
    ///
    /// For rings, a trailing closing vertex is stripped.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is idle, or if a vertex is not finite.
    pub fn begin_edit(&mut self, vertices: &[Vertex]) -> Result<(), SessionError> {
        let open = self.kind.topology.open(vertices);
        self.begin(open, None, ShapeMetadata::default())
    }

    /// Starts editing a persisted shape, seeding vertices, metadata and the
    /// save target.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::KindMismatch`] if the shape was saved under another
    /// kind, otherwise the same errors as [`EditSession::begin_edit`].
    pub fn begin_edit_shape(&mut self, shape: &PersistedShape) -> Result<(), SessionError> {
        if shape.kind != self.kind.name {
            warn!(
                expected = %self.kind.name,
                found = %shape.kind,
                id = %shape.id,
                "shape kind mismatch"
            );
            return Err(SessionError::KindMismatch);
        }
        let open = self.kind.topology.open(&shape.vertices);
        self.begin(open, Some(shape.id), shape.metadata.clone())
    }

    fn begin(
        &mut self,
        vertices: Vec<Vertex>,
        target: Option<ShapeId>,
        metadata: ShapeMetadata,
    ) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => {}
            SessionState::Committing { .. } => return Err(SessionError::CommitInFlight),
            SessionState::Editing | SessionState::Dragging { .. } => {
                return Err(SessionError::AlreadyEditing)
            }
        }
        if !vertices.iter().all(|v| v.is_finite()) {
            return Err(SessionError::NonFiniteVertex);
        }
        debug!(kind = %self.kind.name, seeded = vertices.len(), ?target, "session started");
        self.vertices = vertices;
        self.history.clear();
        self.target = target;
        self.metadata = metadata;
        self.state = SessionState::Editing;
        Ok(())
    }

    /// Discards all work and returns to idle. Valid in every state.
    ///
    /// A save already in flight is not affected; its outcome only reaches the
    /// store.
    pub fn cancel(&mut self) {
        if self.state != SessionState::Idle {
            debug!(kind = %self.kind.name, "session cancelled");
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.vertices.clear();
        self.history.clear();
        self.target = None;
        self.metadata = ShapeMetadata::default();
        self.state = SessionState::Idle;
    }

    fn require_editing(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Editing => Ok(()),
            SessionState::Idle => Err(SessionError::NotEditing),
            SessionState::Dragging { .. } => Err(SessionError::DragInProgress),
            SessionState::Committing { .. } => Err(SessionError::CommitInFlight),
        }
    }

    // --- Vertex commands ---

    /// Appends a vertex and returns its index.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is editing and not dragging, or if
    /// the vertex is not finite.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Result<usize, SessionError> {
        self.require_editing()?;
        if !vertex.is_finite() {
            return Err(SessionError::NonFiniteVertex);
        }
        let index = self.vertices.len();
        self.vertices.push(vertex);
        self.history.record(Action::Add { vertex, index });
        debug!(index, lat = vertex.lat, lng = vertex.lng, "vertex added");
        Ok(index)
    }

    /// Starts relocating the vertex at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is editing, or if `index` is out of range.
    pub fn begin_drag(&mut self, index: usize) -> Result<(), SessionError> {
        self.require_editing()?;
        let start = *self
            .vertices
            .get(index)
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: self.vertices.len(),
            })?;
        self.state = SessionState::Dragging { index, start };
        debug!(index, "drag started");
        Ok(())
    }

    /// Moves the dragged vertex. Intermediate positions are not recorded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveDrag`] unless a drag is in progress, and
    /// [`SessionError::NonFiniteVertex`] for a non-finite position. A rejected
    /// position leaves the vertex where it was.
    pub fn update_drag(&mut self, position: Vertex) -> Result<(), SessionError> {
        let SessionState::Dragging { index, .. } = self.state else {
            return Err(self.no_drag_error());
        };
        if !position.is_finite() {
            return Err(SessionError::NonFiniteVertex);
        }
        let slot = self
            .vertices
            .get_mut(index)
            .ok_or(SessionError::HistoryOutOfSync)?;
        *slot = position;
        Ok(())
    }

    /// Finishes the drag, recording the net move if the vertex changed position.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveDrag`] unless a drag is in progress.
    pub fn end_drag(&mut self) -> Result<Option<Action>, SessionError> {
        let SessionState::Dragging { index, start } = self.state else {
            return Err(self.no_drag_error());
        };
        let end = *self
            .vertices
            .get(index)
            .ok_or(SessionError::HistoryOutOfSync)?;
        self.state = SessionState::Editing;

        if end == start {
            debug!(index, "drag ended without movement");
            return Ok(None);
        }
        let action = Action::Move {
            index,
            from: start,
            to: end,
        };
        self.history.record(action);
        debug!(index, "drag ended");
        Ok(Some(action))
    }

    fn no_drag_error(&self) -> SessionError {
        match self.state {
            SessionState::Committing { .. } => SessionError::CommitInFlight,
            _ => SessionError::NoActiveDrag,
        }
    }

    /// Removes the most recently placed vertex and returns it.
    ///
    /// Allowed for new and loaded shapes alike; the removal is recorded and
    /// can be undone.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is editing, or if there are no vertices.
    pub fn remove_last(&mut self) -> Result<Vertex, SessionError> {
        self.require_editing()?;
        let vertex = self.vertices.pop().ok_or(SessionError::NothingToRemove)?;
        let index = self.vertices.len();
        self.history.record(Action::Remove { vertex, index });
        debug!(index, "last vertex removed");
        Ok(vertex)
    }

    // --- History ---

    /// Reverts the most recent action and returns it. `Ok(None)` when there is
    /// nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is editing and not dragging.
    pub fn undo(&mut self) -> Result<Option<Action>, SessionError> {
        self.require_editing()?;
        let Some(action) = self.history.undo() else {
            return Ok(None);
        };
        if let Err(err) = self.apply(action.inverse()) {
            self.history.unwind_undo();
            return Err(err);
        }
        debug!(?action, "undo");
        Ok(Some(action))
    }

    /// Re-applies the most recently undone action and returns it. `Ok(None)`
    /// when there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is editing and not dragging.
    pub fn redo(&mut self) -> Result<Option<Action>, SessionError> {
        self.require_editing()?;
        let Some(action) = self.history.redo() else {
            return Ok(None);
        };
        if let Err(err) = self.apply(action) {
            self.history.unwind_redo();
            return Err(err);
        }
        debug!(?action, "redo");
        Ok(Some(action))
    }

    fn apply(&mut self, action: Action) -> Result<(), SessionError> {
        match action {
            Action::Add { vertex, index } => {
                if index > self.vertices.len() {
                    return Err(SessionError::HistoryOutOfSync);
                }
                self.vertices.insert(index, vertex);
            }
            Action::Remove { index, .. } => {
                if index >= self.vertices.len() {
                    return Err(SessionError::HistoryOutOfSync);
                }
                self.vertices.remove(index);
            }
            Action::Move { index, to, .. } => {
                let slot = self
                    .vertices
                    .get_mut(index)
                    .ok_or(SessionError::HistoryOutOfSync)?;
                *slot = to;
            }
        }
        Ok(())
    }

    // --- Commit ---

    /// Checks the working shape against the kind's rules.
    ///
    /// # Errors
    ///
    /// Returns the first rule violated: vertex count, self-intersection (rings
    /// only), then required metadata fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = self.kind.required_vertices();
        if self.vertices.len() < required {
            return Err(ValidationError::TooFewVertices {
                required,
                actual: self.vertices.len(),
            });
        }
        if self.kind.topology == Topology::Ring {
            let crossings = find_crossings(&self.vertices);
            if !crossings.is_empty() {
                return Err(ValidationError::SelfIntersecting { crossings });
            }
        }
        if let Some(field) = self.metadata.first_missing(&self.kind.required_fields) {
            return Err(ValidationError::MissingRequiredField(field.to_string()));
        }
        Ok(())
    }

    /// Validates the shape and snapshots it for saving.
    ///
    /// On success the session enters [`SessionState::Committing`] and refuses
    /// further edits until [`EditSession::complete_commit`] or
    /// [`EditSession::abort_commit`] is called with the request's ticket. On
    /// failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns a session error if not in the editing state, or a validation error.
    pub fn prepare_commit(&mut self) -> Result<CommitRequest, CommitError> {
        self.require_editing()?;
        self.validate()?;

        let ticket = CommitTicket(self.next_ticket);
        self.next_ticket += 1;
        let request = CommitRequest {
            ticket,
            target: self.target,
            kind: self.kind.name.clone(),
            topology: self.kind.topology,
            default_color: self.kind.default_color.clone(),
            vertices: self.kind.topology.close(&self.vertices),
            metadata: self.metadata.clone(),
        };
        self.state = SessionState::Committing { ticket };
        debug!(
            kind = %self.kind.name,
            %ticket,
            vertices = request.vertices.len(),
            "commit prepared"
        );
        Ok(request)
    }

    /// Marks the commit holding `ticket` as saved and resets the session.
    ///
    /// Returns `false` (and does nothing) unless that commit is the one in
    /// flight, e.g. because the session was cancelled and has since started
    /// another shape.
    pub fn complete_commit(&mut self, ticket: CommitTicket) -> bool {
        if !self.is_in_flight(ticket) {
            debug!(%ticket, "stale commit completion ignored");
            return false;
        }
        self.reset();
        true
    }

    /// Returns to editing after the save for `ticket` failed, keeping all work.
    ///
    /// Returns `false` (and does nothing) unless that commit is the one in flight.
    pub fn abort_commit(&mut self, ticket: CommitTicket) -> bool {
        if !self.is_in_flight(ticket) {
            debug!(%ticket, "stale commit abort ignored");
            return false;
        }
        self.state = SessionState::Editing;
        true
    }

    fn is_in_flight(&self, ticket: CommitTicket) -> bool {
        self.state == SessionState::Committing { ticket }
    }

    /// Validates, enriches and saves the shape in one step.
    ///
    /// A geocoding failure substitutes `address_placeholder`. A storage failure
    /// leaves the session editing with its vertices intact so the user can retry.
    ///
    /// # Errors
    ///
    /// Returns a session, validation or storage error.
    pub fn commit<S, G>(
        &mut self,
        store: &mut S,
        geocoder: &G,
        address_placeholder: &str,
    ) -> Result<PersistedShape, CommitError>
    where
        S: ShapeStore + ?Sized,
        G: Geocoder + ?Sized,
    {
        let request = self.prepare_commit()?;
        let ticket = request.ticket;
        match request.persist(store, geocoder, address_placeholder) {
            Ok(shape) => {
                self.complete_commit(ticket);
                info!(
                    id = %shape.id,
                    kind = %shape.kind,
                    vertices = shape.vertices.len(),
                    "shape committed"
                );
                Ok(shape)
            }
            Err(err) => {
                self.abort_commit(ticket);
                Err(err.into())
            }
        }
    }
}
