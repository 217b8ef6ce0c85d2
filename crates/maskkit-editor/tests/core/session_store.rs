use maskkit_core::{
    AppEvent, BoundingBox, EditEvent, EventCategory, EventFilter, LassoMode, ObjectId, Point,
    SessionError, SessionEvent, ToolMode,
};
use maskkit_editor::{PredictionRequest, SessionStore};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::support::{object, session, square, store};

fn populated() -> SessionStore {
    let mut store = store();
    store
        .add_object(object("a", square(0.0, 0.0, 50.0, 50.0)))
        .expect("add a");
    store
        .add_object(object("b", square(60.0, 60.0, 120.0, 120.0)))
        .expect("add b");
    store
}

#[test]
fn test_switch_image_clears_per_image_state() {
    let mut store = populated();
    store.select_object(Some(ObjectId::from("b"))).expect("select");
    store.set_tool_mode(ToolMode::Lasso);
    store.set_lasso_mode(LassoMode::Subtract);
    let ticket = store
        .begin_prediction(
            PredictionRequest::Box {
                image_id: "img1".to_string(),
                bbox: BoundingBox::new(0.0, 0.0, 40.0, 40.0),
            },
            2.0,
        )
        .expect("ticket");
    assert_eq!(store.pending_predictions(), 1);
    assert!(store.has_unsaved_changes());

    store.switch_image("img2").expect("switch");

    assert_eq!(store.current_image_id(), Some("img2"));
    assert!(store.objects().is_empty());
    assert!(store.selected_id().is_none());
    assert!(store.history().is_empty());
    assert!(!store.can_undo());
    assert!(!store.can_redo());
    assert_eq!(store.pending_predictions(), 0);
    assert!(!store.is_loading());
    assert!(!store.has_unsaved_changes());
    assert_eq!(store.tool_mode(), ToolMode::Select);
    assert_eq!(store.lasso_mode(), LassoMode::Add);
    assert!(ticket.generation < store.generation());
}

#[test]
fn test_switch_to_unknown_image_keeps_state() {
    let mut store = populated();
    let err = store.switch_image("missing").unwrap_err();
    assert!(matches!(err, SessionError::ImageNotFound { .. }));
    assert_eq!(store.current_image_id(), Some("img1"));
    assert_eq!(store.objects().len(), 2);
}

#[test]
fn test_switch_without_session() {
    let mut store = SessionStore::new();
    assert!(matches!(
        store.switch_image("img1"),
        Err(SessionError::NoSession)
    ));
}

#[test]
fn test_mutations_publish_events() {
    let mut store = store();
    let edits = Arc::new(AtomicUsize::new(0));
    let counter = edits.clone();
    store.events().subscribe(
        EventFilter::Categories(vec![EventCategory::Edit]),
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        },
    );

    let id = store
        .add_object(object("a", square(0.0, 0.0, 50.0, 50.0)))
        .expect("add");
    store.select_object(Some(id.clone())).expect("select");
    store.delete_object(&id).expect("delete");

    // Added, SelectionChanged(a), SelectionChanged(None), Deleted.
    assert_eq!(edits.load(Ordering::SeqCst), 4);
}

#[test]
fn test_switch_publishes_image_changed() {
    let mut store = store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    store
        .events()
        .subscribe(EventFilter::All, move |event| sink.lock().push(event));

    store.switch_image("img2").expect("switch");
    assert!(seen.lock().contains(&AppEvent::Session(SessionEvent::ImageChanged {
        image_id: "img2".to_string(),
    })));
}

#[test]
fn test_delete_clears_selection_and_can_be_undone() {
    let mut store = populated();
    store.select_object(Some(ObjectId::from("b"))).expect("select");

    let removed = store.delete_selected().expect("deleted");
    assert_eq!(removed.id, ObjectId::from("b"));
    assert!(store.selected_id().is_none());
    assert_eq!(store.objects().len(), 1);

    // Snapshots are [empty, {a}, {a, b}] with the cursor on the last one;
    // undo restores the entry before it and redo brings back {a, b}.
    assert!(store.undo());
    assert_eq!(store.objects().len(), 1);
    assert!(store.redo());
    assert_eq!(store.objects().len(), 2);
    assert!(store.object(&ObjectId::from("b")).is_some());
}

#[test]
fn test_undo_drops_dangling_selection() {
    let mut store = populated();
    store.select_object(Some(ObjectId::from("b"))).expect("select");

    // History holds [empty, {a}]; stepping back removes `b`.
    assert!(store.undo());
    assert_eq!(store.objects().len(), 0);
    assert!(store.selected_id().is_none());
}

#[test]
fn test_undo_publishes_restored() {
    let mut store = populated();
    store.events().clear_history();
    assert!(store.undo());
    let history = store.events().history(None);
    assert!(history.contains(&AppEvent::Edit(EditEvent::Restored {
        undo: true,
        count: 0,
    })));
}

#[test]
fn test_select_unknown_object_fails() {
    let mut store = populated();
    assert!(store.select_object(Some(ObjectId::from("zzz"))).is_err());
    assert!(store.selected_id().is_none());
}

#[test]
fn test_selection_is_not_undoable() {
    let mut store = populated();
    let index = store.history().index();
    store.select_object(Some(ObjectId::from("a"))).expect("select");
    assert_eq!(store.history().index(), index);
}

#[test]
fn test_set_object_class() {
    let mut store = populated();
    let id = ObjectId::from("a");
    store.set_object_class(&id, 1).expect("class");
    let obj = store.object(&id).expect("object");
    assert_eq!(obj.class_id, 1);
    assert_eq!(obj.class_name, "person");

    assert!(matches!(
        store.set_object_class(&id, 7),
        Err(SessionError::UnknownClass { class_id: 7 })
    ));
}

#[test]
fn test_current_class_bounded_by_session() {
    let mut store = store();
    assert!(store.set_current_class(1));
    assert!(!store.set_current_class(2));
    assert_eq!(store.current_class(), 1);
}

#[test]
fn test_update_object_replaces_in_place() {
    let mut store = populated();
    let mut updated = store.object(&ObjectId::from("a")).cloned().expect("a");
    updated.points_pos.push(Point::new(5.0, 5.0));
    store.update_object(updated).expect("update");

    assert_eq!(store.objects()[0].points_pos, vec![Point::new(5.0, 5.0)]);
    assert_eq!(store.objects()[1].id, ObjectId::from("b"));
}

#[test]
fn test_objects_require_active_image() {
    let mut store = SessionStore::new();
    store.set_session(session()).expect("session");
    assert!(matches!(
        store.add_object(object("a", square(0.0, 0.0, 10.0, 10.0))),
        Err(SessionError::NoActiveImage)
    ));
}

#[test]
fn test_prediction_for_other_image_rejected() {
    let mut store = store();
    let err = store
        .begin_prediction(
            PredictionRequest::Auto {
                image_id: "img2".to_string(),
            },
            2.0,
        )
        .unwrap_err();
    assert!(matches!(err, SessionError::ImageNotActive { .. }));
    assert_eq!(store.pending_predictions(), 0);
}
