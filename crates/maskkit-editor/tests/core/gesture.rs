use maskkit_core::{BoundingBox, LassoMode, ObjectId, Point, ToolMode};
use maskkit_editor::{
    Effect, GestureKey, GestureMachine, GestureState, Modifiers, PointerButton, PointerEvent,
    PredictionRequest, SessionStore,
};

use crate::support::{object, square, store};

fn down(machine: &mut GestureMachine, store: &SessionStore, event: PointerEvent) -> Effect {
    machine.on_pointer_down(event, &store.gesture_context())
}

fn drag(machine: &mut GestureMachine, store: &SessionStore, x: f64, y: f64) -> Effect {
    machine.on_pointer_move(Point::new(x, y), &store.gesture_context())
}

fn up(machine: &mut GestureMachine, store: &SessionStore, x: f64, y: f64) -> Effect {
    machine.on_pointer_up(PointerEvent::primary(x, y), &store.gesture_context())
}

/// Store at identity viewport with two overlapping objects, `b` on top.
fn stacked() -> SessionStore {
    let mut store = store();
    store.set_scale(1.0);
    store.set_offset(0.0, 0.0);
    store
        .add_objects(vec![
            object("a", square(0.0, 0.0, 100.0, 100.0)),
            object("b", square(50.0, 50.0, 150.0, 150.0)),
        ])
        .expect("objects");
    store
}

// =============================================================================
// BOUNDING BOX
// =============================================================================

#[test]
fn test_small_box_produces_nothing() {
    let mut store = stacked();
    store.set_tool_mode(ToolMode::BoundingBox);
    let mut machine = GestureMachine::new();

    down(&mut machine, &store, PointerEvent::primary(20.0, 20.0));
    let effect = up(&mut machine, &store, 30.0, 60.0);
    assert_eq!(effect, Effect::None);
    assert!(machine.is_idle());
    assert_eq!(store.apply_effect(effect), None);
}

#[test]
fn test_box_respects_scaled_viewport() {
    let mut store = stacked();
    store.set_tool_mode(ToolMode::BoundingBox);
    store.set_scale(2.0);
    store.set_offset(10.0, 10.0);
    let mut machine = GestureMachine::new();

    down(&mut machine, &store, PointerEvent::primary(30.0, 30.0));
    drag(&mut machine, &store, 70.0, 50.0);
    let effect = up(&mut machine, &store, 110.0, 90.0);
    assert_eq!(
        effect,
        Effect::CreateObject(BoundingBox::new(10.0, 10.0, 50.0, 40.0))
    );

    match store.apply_effect(effect) {
        Some(PredictionRequest::Box { image_id, bbox }) => {
            assert_eq!(image_id, "img1");
            assert_eq!(bbox, BoundingBox::new(10.0, 10.0, 50.0, 40.0));
        }
        other => panic!("unexpected request {:?}", other),
    }
}

#[test]
fn test_box_drawn_upwards_is_normalized() {
    let mut store = stacked();
    store.set_tool_mode(ToolMode::BoundingBox);
    let mut machine = GestureMachine::new();

    down(&mut machine, &store, PointerEvent::primary(120.0, 90.0));
    let effect = up(&mut machine, &store, 40.0, 10.0);
    assert_eq!(
        effect,
        Effect::CreateObject(BoundingBox::new(40.0, 10.0, 120.0, 90.0))
    );
}

// =============================================================================
// LASSO
// =============================================================================

#[test]
fn test_lasso_needs_selection() {
    let mut store = stacked();
    store.set_tool_mode(ToolMode::Lasso);
    let mut machine = GestureMachine::new();

    down(&mut machine, &store, PointerEvent::primary(10.0, 10.0));
    assert!(machine.is_idle());
}

#[test]
fn test_lasso_stroke_drops_out_of_bounds_points() {
    let mut store = stacked();
    store.set_tool_mode(ToolMode::Lasso);
    store.set_lasso_mode(LassoMode::Subtract);
    store.select_object(Some(ObjectId::from("a"))).expect("select");
    let mut machine = GestureMachine::new();

    down(&mut machine, &store, PointerEvent::primary(10.0, 10.0));
    drag(&mut machine, &store, 10.3, 10.3);
    drag(&mut machine, &store, 60.0, 10.0);
    drag(&mut machine, &store, 260.0, 10.0);
    drag(&mut machine, &store, 60.0, 60.0);
    let effect = up(&mut machine, &store, 10.0, 60.0);

    assert_eq!(
        effect,
        Effect::EditObject {
            id: ObjectId::from("a"),
            stroke: vec![
                Point::new(10.0, 10.0),
                Point::new(10.3, 10.3),
                Point::new(60.0, 10.0),
                Point::new(60.0, 60.0),
                Point::new(10.0, 60.0),
            ],
            mode: LassoMode::Subtract,
        }
    );
}

#[test]
fn test_short_lasso_is_discarded() {
    let mut store = stacked();
    store.set_tool_mode(ToolMode::Lasso);
    store.select_object(Some(ObjectId::from("a"))).expect("select");
    let mut machine = GestureMachine::new();

    down(&mut machine, &store, PointerEvent::primary(10.0, 10.0));
    drag(&mut machine, &store, 30.0, 10.0);
    let effect = up(&mut machine, &store, 30.0, 10.0);
    assert_eq!(effect, Effect::None);
    assert!(machine.is_idle());
}

#[test]
fn test_lasso_keeps_close_samples_at_high_zoom() {
    let mut store = stacked();
    store.set_scale(4.0);
    store.set_tool_mode(ToolMode::Lasso);
    store.select_object(Some(ObjectId::from("a"))).expect("select");
    let mut machine = GestureMachine::new();

    down(&mut machine, &store, PointerEvent::primary(40.0, 40.0));
    drag(&mut machine, &store, 42.0, 40.0);
    let effect = up(&mut machine, &store, 42.0, 42.0);

    assert_eq!(
        effect,
        Effect::EditObject {
            id: ObjectId::from("a"),
            stroke: vec![
                Point::new(10.0, 10.0),
                Point::new(10.5, 10.0),
                Point::new(10.5, 10.5),
            ],
            mode: LassoMode::Add,
        }
    );
}

#[test]
fn test_lasso_effect_edits_selected_object() {
    let mut store = stacked();
    store.set_tool_mode(ToolMode::Lasso);
    store.select_object(Some(ObjectId::from("a"))).expect("select");
    let mut machine = GestureMachine::new();

    down(&mut machine, &store, PointerEvent::primary(90.0, 0.0));
    drag(&mut machine, &store, 120.0, 0.0);
    drag(&mut machine, &store, 120.0, 40.0);
    let effect = up(&mut machine, &store, 90.0, 40.0);

    assert_eq!(store.apply_effect(effect), None);
    let edited = store.object(&ObjectId::from("a")).expect("object");
    assert!((edited.bbox.x_max - 120.0).abs() < 1e-6);
    assert!((edited.area() - 10_000.0 - 800.0).abs() < 1e-6);
}

// =============================================================================
// PANNING
// =============================================================================

#[test]
fn test_pan_abandons_drawing() {
    let mut store = stacked();
    store.set_tool_mode(ToolMode::BoundingBox);
    let mut machine = GestureMachine::new();

    down(&mut machine, &store, PointerEvent::primary(10.0, 10.0));
    assert!(matches!(machine.state(), GestureState::DrawingBox { .. }));

    down(
        &mut machine,
        &store,
        PointerEvent::primary(50.0, 50.0).with_button(PointerButton::Secondary),
    );
    assert!(matches!(machine.state(), GestureState::Panning { .. }));

    let effect = drag(&mut machine, &store, 55.0, 47.0);
    assert_eq!(effect, Effect::Pan { dx: 5.0, dy: -3.0 });
    store.apply_effect(effect);
    assert_eq!(store.viewport().offset(), Point::new(5.0, -3.0));

    assert_eq!(up(&mut machine, &store, 55.0, 47.0), Effect::None);
    assert!(machine.is_idle());
    assert!(store.objects().len() == 2);
}

#[test]
fn test_space_turns_primary_into_pan() {
    let mut store = stacked();
    store.set_tool_mode(ToolMode::BoundingBox);
    let mut machine = GestureMachine::new();

    machine.on_key_down(GestureKey::Space);
    down(&mut machine, &store, PointerEvent::primary(10.0, 10.0));
    assert!(matches!(machine.state(), GestureState::Panning { .. }));
    up(&mut machine, &store, 10.0, 10.0);

    machine.on_key_up(GestureKey::Space);
    down(&mut machine, &store, PointerEvent::primary(10.0, 10.0));
    assert!(matches!(machine.state(), GestureState::DrawingBox { .. }));
}

#[test]
fn test_middle_button_pans_in_any_tool() {
    let store = stacked();
    let mut machine = GestureMachine::new();
    down(
        &mut machine,
        &store,
        PointerEvent::primary(0.0, 0.0).with_button(PointerButton::Middle),
    );
    assert!(matches!(machine.state(), GestureState::Panning { .. }));
}

// =============================================================================
// SELECTION AND POINTS
// =============================================================================

#[test]
fn test_click_selects_topmost_object() {
    let mut store = stacked();
    let mut machine = GestureMachine::new();

    let effect = down(&mut machine, &store, PointerEvent::primary(75.0, 75.0));
    assert_eq!(effect, Effect::Select(Some(ObjectId::from("b"))));
    store.apply_effect(effect);
    assert_eq!(store.selected_id(), Some(&ObjectId::from("b")));

    // Clicking the selection again changes nothing.
    assert_eq!(
        down(&mut machine, &store, PointerEvent::primary(75.0, 75.0)),
        Effect::None
    );
}

#[test]
fn test_click_on_empty_space_deselects() {
    let mut store = stacked();
    store.select_object(Some(ObjectId::from("a"))).expect("select");
    let mut machine = GestureMachine::new();

    let effect = down(&mut machine, &store, PointerEvent::primary(190.0, 190.0));
    assert_eq!(effect, Effect::Select(None));
    store.apply_effect(effect);
    assert!(store.selected_id().is_none());

    assert_eq!(
        down(&mut machine, &store, PointerEvent::primary(190.0, 190.0)),
        Effect::None
    );
}

#[test]
fn test_modifier_clicks_add_points() {
    let mut store = stacked();
    store.select_object(Some(ObjectId::from("a"))).expect("select");
    let mut machine = GestureMachine::new();

    let shift = Modifiers {
        shift: true,
        alt: false,
    };
    let effect = down(
        &mut machine,
        &store,
        PointerEvent::primary(20.0, 30.0).with_modifiers(shift),
    );
    assert_eq!(
        effect,
        Effect::AddPoint {
            id: ObjectId::from("a"),
            point: Point::new(20.0, 30.0),
            positive: true,
        }
    );
    match store.apply_effect(effect) {
        Some(PredictionRequest::Points {
            object_id,
            positives,
            negatives,
            bbox,
            ..
        }) => {
            assert_eq!(object_id, ObjectId::from("a"));
            assert_eq!(positives, vec![Point::new(20.0, 30.0)]);
            assert!(negatives.is_empty());
            assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        }
        other => panic!("unexpected request {:?}", other),
    }

    let alt = Modifiers {
        shift: false,
        alt: true,
    };
    let effect = down(
        &mut machine,
        &store,
        PointerEvent::primary(40.0, 40.0).with_modifiers(alt),
    );
    assert!(matches!(effect, Effect::AddPoint { positive: false, .. }));
}

#[test]
fn test_modifier_click_without_selection_is_ignored() {
    let store = stacked();
    let mut machine = GestureMachine::new();
    let shift = Modifiers {
        shift: true,
        alt: false,
    };
    assert_eq!(
        down(
            &mut machine,
            &store,
            PointerEvent::primary(20.0, 30.0).with_modifiers(shift),
        ),
        Effect::None
    );
}

#[test]
fn test_no_image_means_no_gestures() {
    let mut store = SessionStore::new();
    store.set_tool_mode(ToolMode::BoundingBox);
    let mut machine = GestureMachine::new();
    down(&mut machine, &store, PointerEvent::primary(10.0, 10.0));
    assert!(machine.is_idle());
}
