use maskkit_core::{geometry, GeometryError, LassoMode, NoticeEvent, ObjectId, Point, Ring};
use maskkit_editor::{apply_lasso, CsgLargestRing, PolygonCombiner, SessionStore};
use std::sync::Arc;

use crate::support::{object, session, size, square, store};

const TOLERANCE: f64 = 1e-6;

fn edited(stroke: Ring, mode: LassoMode) -> Result<maskkit_core::AnnotationObject, GeometryError> {
    let mut obj = object("a", square(0.0, 0.0, 100.0, 100.0));
    apply_lasso(&CsgLargestRing, &mut obj, &stroke, mode, size())?;
    Ok(obj)
}

#[test]
fn test_union_of_overlapping_squares() {
    let obj = edited(square(50.0, 50.0, 150.0, 150.0), LassoMode::Add).expect("union");
    assert!((obj.area() - 17_500.0).abs() < TOLERANCE);

    let bbox = obj.bbox;
    assert!(bbox.x_min.abs() < TOLERANCE);
    assert!(bbox.y_min.abs() < TOLERANCE);
    assert!((bbox.x_max - 150.0).abs() < TOLERANCE);
    assert!((bbox.y_max - 150.0).abs() < TOLERANCE);
    assert_eq!(obj.polygon_normalized.len(), obj.polygon.len());
}

#[test]
fn test_subtract_corner_keeps_l_shape() {
    let obj = edited(square(50.0, 50.0, 150.0, 150.0), LassoMode::Subtract).expect("subtract");
    assert!(obj.area() < 10_000.0);
    assert!((obj.area() - 7_500.0).abs() < TOLERANCE);
    assert!((obj.bbox.x_max - 100.0).abs() < TOLERANCE);
    assert!((obj.bbox.y_max - 100.0).abs() < TOLERANCE);
}

#[test]
fn test_bisecting_stroke_keeps_larger_piece() {
    let stroke = square(30.0, -10.0, 35.0, 110.0);
    let obj = edited(stroke, LassoMode::Subtract).expect("bisect");

    // Pieces are 30x100 and 65x100; the right-hand one wins.
    assert!((obj.area() - 6_500.0).abs() < TOLERANCE);
    assert!((obj.bbox.x_min - 35.0).abs() < TOLERANCE);
    assert!((obj.bbox.x_max - 100.0).abs() < TOLERANCE);
}

#[test]
fn test_open_stroke_is_closed_before_clipping() {
    let open = vec![
        Point::new(50.0, 50.0),
        Point::new(150.0, 50.0),
        Point::new(150.0, 150.0),
        Point::new(50.0, 150.0),
    ];
    assert!(!geometry::is_closed(&open));
    let obj = edited(open, LassoMode::Add).expect("union");
    assert!((obj.area() - 17_500.0).abs() < TOLERANCE);
}

#[test]
fn test_subtracting_everything_fails() {
    let err = edited(square(-10.0, -10.0, 120.0, 120.0), LassoMode::Subtract).unwrap_err();
    assert!(matches!(err, GeometryError::EmptyResult { .. }));
}

#[test]
fn test_non_finite_stroke_is_rejected() {
    let stroke = vec![
        Point::new(10.0, 10.0),
        Point::new(f64::NAN, 20.0),
        Point::new(30.0, 10.0),
    ];
    let err = edited(stroke, LassoMode::Add).unwrap_err();
    assert!(matches!(err, GeometryError::NonFiniteCoordinate));
}

/// Combiner that always answers with the same ring.
struct FixedCombiner(Ring);

impl PolygonCombiner for FixedCombiner {
    fn combine(
        &self,
        _subject: &[Point],
        _stroke: &[Point],
        _mode: LassoMode,
    ) -> Result<Ring, GeometryError> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_store_uses_injected_combiner() {
    let replacement = square(10.0, 10.0, 20.0, 20.0);
    let mut store =
        SessionStore::new().with_combiner(Arc::new(FixedCombiner(replacement.clone())));
    store.set_session(session()).expect("session");
    store.switch_image("img1").expect("switch");
    let id = store
        .add_object(object("a", square(0.0, 0.0, 100.0, 100.0)))
        .expect("add");

    store
        .apply_lasso(&id, &square(50.0, 50.0, 150.0, 150.0), LassoMode::Add)
        .expect("lasso");
    assert_eq!(store.object(&id).expect("object").polygon, replacement);
}

#[test]
fn test_store_lasso_pushes_history_and_marks_unsaved() {
    let mut store = store();
    let id = store
        .add_object(object("a", square(0.0, 0.0, 100.0, 100.0)))
        .expect("add");
    let index = store.history().index();

    store
        .apply_lasso(&id, &square(50.0, 50.0, 150.0, 150.0), LassoMode::Add)
        .expect("lasso");
    assert_eq!(store.history().index(), index.map(|i| i + 1));
    assert!(store.has_unsaved_changes());
    assert!((store.object(&id).expect("object").area() - 17_500.0).abs() < TOLERANCE);
}

#[test]
fn test_store_failed_lasso_changes_nothing() {
    let mut store = store();
    let id = store
        .add_object(object("a", square(0.0, 0.0, 100.0, 100.0)))
        .expect("add");
    let before = store.object(&id).cloned();
    let index = store.history().index();
    let revision = store.revision();
    store.events().clear_history();

    let stroke = vec![Point::new(10.0, 10.0), Point::new(20.0, 20.0)];
    assert!(store.apply_lasso(&id, &stroke, LassoMode::Add).is_err());

    assert_eq!(store.object(&id).cloned(), before);
    assert_eq!(store.history().index(), index);
    assert_eq!(store.revision(), revision);

    let notices = store.events().recent_notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(
        &notices[0],
        NoticeEvent::GeometryFailure { object_id, .. } if object_id == "a"
    ));
}

#[test]
fn test_store_lasso_on_unknown_object() {
    let mut store = store();
    let result = store.apply_lasso(
        &ObjectId::from("ghost"),
        &square(0.0, 0.0, 10.0, 10.0),
        LassoMode::Add,
    );
    assert!(result.is_err());
}
