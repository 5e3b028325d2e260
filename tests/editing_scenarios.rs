#![allow(clippy::unwrap_used)]

use std::cell::RefCell;

use approx::assert_relative_eq;
use geoedit::{
    CommitError, EditSession, EditorConfig, GeocodeError, Geocoder, InMemoryShapeStore,
    SessionError, SessionState, ShapeKind, ShapeStore, StorageError, ValidationError, Vertex,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every lookup and always gives the same answer.
struct ScriptedGeocoder {
    answer: Result<String, GeocodeError>,
    lookups: RefCell<Vec<Vertex>>,
}

impl ScriptedGeocoder {
    fn answering(answer: Result<String, GeocodeError>) -> Self {
        Self {
            answer,
            lookups: RefCell::new(Vec::new()),
        }
    }
}

impl Geocoder for ScriptedGeocoder {
    fn reverse_geocode(&self, at: Vertex) -> Result<String, GeocodeError> {
        self.lookups.borrow_mut().push(at);
        self.answer.clone()
    }
}

fn v(lat: f64, lng: f64) -> Vertex {
    Vertex::new(lat, lng)
}

#[test]
fn draw_and_commit_project_area() {
    init_tracing();
    let config = EditorConfig::default();
    let mut store = InMemoryShapeStore::new();
    let geocoder = ScriptedGeocoder::answering(Ok("Zone 4, Carmen".into()));

    let mut session = EditSession::new(config.kind("project_area").unwrap().clone());
    session.begin_new().unwrap();
    session.add_vertex(v(8.50, 124.64)).unwrap();
    session.add_vertex(v(8.51, 124.64)).unwrap();
    session.add_vertex(v(8.51, 124.65)).unwrap();
    session.metadata_mut().title = "Covered court".into();

    let saved = session
        .commit(&mut store, &geocoder, &config.address_placeholder)
        .unwrap();

    assert_eq!(
        saved.vertices,
        vec![v(8.50, 124.64), v(8.51, 124.64), v(8.51, 124.65), v(8.50, 124.64)]
    );
    assert_eq!(saved.metadata.address.as_deref(), Some("Zone 4, Carmen"));
    assert_eq!(saved.metadata.color.as_deref(), Some("#3388ff"));

    // The geocoder was asked about the triangle's centroid.
    let lookups = geocoder.lookups.borrow();
    assert_eq!(lookups.len(), 1);
    assert_relative_eq!(lookups[0].lat, (8.50 + 8.51 + 8.51) / 3.0, epsilon = 1e-9);
    assert_relative_eq!(lookups[0].lng, (124.64 + 124.64 + 124.65) / 3.0, epsilon = 1e-9);

    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.vertices().is_empty());
}

#[test]
fn undoing_every_add_empties_a_fresh_session() {
    let mut session = EditSession::new(ShapeKind::project_area());
    session.begin_new().unwrap();
    session.add_vertex(v(8.50, 124.64)).unwrap();
    session.add_vertex(v(8.51, 124.64)).unwrap();
    session.add_vertex(v(8.51, 124.65)).unwrap();

    for _ in 0..3 {
        assert!(session.undo().unwrap().is_some());
    }
    assert!(session.vertices().is_empty());
    assert_eq!(session.undo(), Ok(None));
}

#[test]
fn geocode_failure_is_not_fatal() {
    let config = EditorConfig::default();
    let mut store = InMemoryShapeStore::new();
    let geocoder = ScriptedGeocoder::answering(Err(GeocodeError::Failed("timeout".into())));

    let mut session = EditSession::new(ShapeKind::road());
    session.begin_new().unwrap();
    session.add_vertex(v(8.50, 124.64)).unwrap();
    session.add_vertex(v(8.50, 124.66)).unwrap();
    session.metadata_mut().title = "Rizal St.".into();

    let saved = session
        .commit(&mut store, &geocoder, &config.address_placeholder)
        .unwrap();
    assert_eq!(saved.vertices.len(), 2);
    assert_eq!(saved.metadata.address.as_deref(), Some("address unavailable"));

    // Roads are geocoded at their midpoint.
    let at = geocoder.lookups.borrow()[0];
    assert_relative_eq!(at.lng, 124.65, epsilon = 1e-9);
}

#[test]
fn bowtie_zone_is_rejected_without_losing_work() {
    let mut store = InMemoryShapeStore::new();
    let geocoder = ScriptedGeocoder::answering(Ok("unused".into()));

    let mut session = EditSession::new(ShapeKind::zone());
    session.begin_new().unwrap();
    for c in [(0.0, 0.0), (1.0, 1.0), (1.0, 0.0), (0.0, 1.0)] {
        session.add_vertex(c.into()).unwrap();
    }
    session.metadata_mut().title = "Zone A".into();
    session.metadata_mut().classification = Some("residential".into());

    let err = session.commit(&mut store, &geocoder, "-").unwrap_err();
    assert!(matches!(
        err,
        CommitError::Validation(ValidationError::SelfIntersecting { .. })
    ));
    assert!(store.is_empty());
    assert!(geocoder.lookups.borrow().is_empty());

    // Dragging the third corner out turns the bowtie into a parallelogram.
    session.begin_drag(2).unwrap();
    session.update_drag(v(0.5, 0.5)).unwrap();
    session.update_drag(v(1.0, 2.0)).unwrap();
    session.end_drag().unwrap();

    let saved = session.commit(&mut store, &geocoder, "-").unwrap();
    assert_eq!(saved.vertices.len(), 5);
    assert_eq!(store.len(), 1);
}

#[test]
fn edit_existing_shape_and_delete_it() {
    let mut store = InMemoryShapeStore::new();
    let geocoder = ScriptedGeocoder::answering(Ok("Poblacion".into()));

    let mut session = EditSession::new(ShapeKind::project_area());
    session.begin_new().unwrap();
    for c in [(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)] {
        session.add_vertex(c.into()).unwrap();
    }
    session.metadata_mut().title = "Market".into();
    let saved = session.commit(&mut store, &geocoder, "-").unwrap();

    let loaded = store.load_shape(saved.id).unwrap();
    session.begin_edit_shape(&loaded).unwrap();
    assert_eq!(session.vertices(), &[v(0.0, 0.0), v(0.0, 2.0), v(2.0, 2.0), v(2.0, 0.0)]);

    session.begin_drag(2).unwrap();
    session.update_drag(v(3.0, 3.0)).unwrap();
    session.end_drag().unwrap();
    let updated = session.commit(&mut store, &geocoder, "-").unwrap();
    assert_eq!(updated.id, saved.id);
    assert_eq!(updated.vertices[2], v(3.0, 3.0));

    store.delete_shape(saved.id).unwrap();
    assert_eq!(store.load_shape(saved.id), Err(StorageError::NotFound(saved.id)));
}

#[test]
fn cancel_discards_everything() {
    let mut session = EditSession::new(ShapeKind::zone());
    session
        .begin_edit(&[v(0.0, 0.0), v(0.0, 2.0), v(2.0, 2.0), v(2.0, 0.0), v(0.0, 0.0)])
        .unwrap();
    assert_eq!(session.vertices().len(), 4);
    session.add_vertex(v(1.0, -1.0)).unwrap();
    session.cancel();

    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.vertices().is_empty());
    assert!(!session.history().can_undo());
    assert!(session.target().is_none());
}

#[test]
fn async_style_commit_snapshot_is_independent() {
    let mut store = InMemoryShapeStore::new();
    let mut session = EditSession::new(ShapeKind::project_area());
    session.begin_new().unwrap();
    for c in [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)] {
        session.add_vertex(c.into()).unwrap();
    }
    session.metadata_mut().title = "Library".into();

    let request = session.prepare_commit().unwrap();
    assert_eq!(request.vertices.last(), Some(&v(0.0, 0.0)));

    // The host cancels while the save is still running.
    session.cancel();
    let saved_ticket = request.ticket;
    let saved = request
        .persist(&mut store, &geoedit::NoGeocoder, "-")
        .unwrap();
    assert!(!session.complete_commit(saved_ticket));
    assert_eq!(saved.vertices.len(), 5);
    assert_eq!(store.len(), 1);
}

#[test]
fn late_save_of_cancelled_shape_keeps_next_shape_after_its_save_fails() {
    let mut session = EditSession::new(ShapeKind::project_area());
    session.begin_new().unwrap();
    for c in [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
        session.add_vertex(c.into()).unwrap();
    }
    session.metadata_mut().title = "Gym".into();
    let old = session.prepare_commit().unwrap();
    session.cancel();

    session.begin_new().unwrap();
    for c in [(3.0, 3.0), (3.0, 4.0), (4.0, 4.0)] {
        session.add_vertex(c.into()).unwrap();
    }
    session.metadata_mut().title = "Clinic".into();
    let new = session.prepare_commit().unwrap();

    // The first save lands after the second one started.
    let mut store = InMemoryShapeStore::new();
    let old_ticket = old.ticket;
    old.persist(&mut store, &geoedit::NoGeocoder, "-").unwrap();
    assert!(!session.complete_commit(old_ticket));

    // The second save fails and the user keeps the clinic outline.
    assert!(session.abort_commit(new.ticket));
    assert_eq!(session.state(), SessionState::Editing);
    assert_eq!(session.vertices(), &[v(3.0, 3.0), v(3.0, 4.0), v(4.0, 4.0)]);
    assert_eq!(session.metadata().title, "Clinic");
    assert_eq!(store.len(), 1);
}

#[test]
fn nan_vertex_never_reaches_the_store() {
    let mut store = InMemoryShapeStore::new();
    let geocoder = ScriptedGeocoder::answering(Ok("unused".into()));

    let mut session = EditSession::new(ShapeKind::project_area());
    session.begin_new().unwrap();
    session.add_vertex(v(0.0, 0.0)).unwrap();
    assert_eq!(session.add_vertex(v(f64::NAN, 1.0)), Err(SessionError::NonFiniteVertex));
    session.add_vertex(v(0.0, 1.0)).unwrap();
    session.add_vertex(v(1.0, 1.0)).unwrap();
    session.metadata_mut().title = "Plaza".into();

    let saved = session.commit(&mut store, &geocoder, "-").unwrap();
    assert!(saved.vertices.iter().all(|p| p.is_finite()));
    assert!(geocoder.lookups.borrow().iter().all(|p| p.is_finite()));

    // A loaded list with a NaN is refused up front.
    assert_eq!(
        session.begin_edit(&[v(0.0, 0.0), v(f64::NAN, 1.0), v(1.0, 1.0), v(0.0, 0.0)]),
        Err(SessionError::NonFiniteVertex)
    );
    assert_eq!(session.state(), SessionState::Idle);
}

#[test]
fn road_cannot_be_opened_as_zone() {
    let mut store = InMemoryShapeStore::new();
    let mut session = EditSession::new(ShapeKind::road());
    session.begin_new().unwrap();
    for c in [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)] {
        session.add_vertex(c.into()).unwrap();
    }
    session.metadata_mut().title = "Ring Rd.".into();
    let saved = session.commit(&mut store, &geoedit::NoGeocoder, "-").unwrap();

    let loaded = store.load_shape(saved.id).unwrap();
    let mut zone = EditSession::new(ShapeKind::zone());
    assert_eq!(zone.begin_edit_shape(&loaded), Err(SessionError::KindMismatch));
    assert_eq!(store.load_shape(saved.id).unwrap().kind, "road");
    assert_eq!(store.load_shape(saved.id).unwrap().vertices.len(), 5);
}
