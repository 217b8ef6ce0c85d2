use maskkit_core::constants::{MAX_SCALE, MIN_SCALE};
use maskkit_core::{ImageSize, Point};
use maskkit_editor::{SessionStore, Viewport, ZoomDirection};
use proptest::prelude::*;

#[test]
fn test_fit_uses_smaller_axis() {
    let mut vp = Viewport::new();
    vp.fit_to_image(ImageSize::new(2000.0, 1000.0), ImageSize::new(1040.0, 840.0));
    assert!((vp.scale() - 0.5).abs() < 1e-12);
    assert!((vp.offset().x - 20.0).abs() < 1e-9);
    assert!((vp.offset().y - 170.0).abs() < 1e-9);
}

#[test]
fn test_zoom_in_then_out_restores_scale() {
    let mut vp = Viewport::new();
    let pointer = Point::new(321.0, 123.0);
    vp.zoom_at(pointer, ZoomDirection::In);
    assert!((vp.scale() - 1.1).abs() < 1e-12);
    vp.zoom_at(pointer, ZoomDirection::Out);
    assert!((vp.scale() - 1.0).abs() < 1e-12);
}

#[test]
fn test_pan_is_independent_of_scale() {
    let mut vp = Viewport::new();
    vp.set_scale(3.0);
    vp.pan_by(10.0, -4.0);
    assert_eq!(vp.offset(), Point::new(10.0, -4.0));
}

proptest! {
    #[test]
    fn prop_fit_scale_and_centering(
        w in 1.0f64..5000.0,
        h in 1.0f64..5000.0,
        cw in 100.0f64..3000.0,
        ch in 100.0f64..3000.0,
    ) {
        let mut vp = Viewport::new();
        vp.fit_to_image(ImageSize::new(w, h), ImageSize::new(cw, ch));

        let expected = ((cw - 40.0) / w)
            .min((ch - 40.0) / h)
            .min(1.0)
            .clamp(MIN_SCALE, MAX_SCALE);
        prop_assert!((vp.scale() - expected).abs() < 1e-9);

        let top_left = vp.image_to_screen(Point::new(0.0, 0.0));
        let bottom_right = vp.image_to_screen(Point::new(w, h));
        prop_assert!(((top_left.x + bottom_right.x) / 2.0 - cw / 2.0).abs() < 1e-6);
        prop_assert!(((top_left.y + bottom_right.y) / 2.0 - ch / 2.0).abs() < 1e-6);
    }

    #[test]
    fn prop_zoom_keeps_pointer_anchor(
        px in -2000.0f64..2000.0,
        py in -2000.0f64..2000.0,
        ox in -1000.0f64..1000.0,
        oy in -1000.0f64..1000.0,
        scale in 0.1f64..5.0,
        zoom_in in any::<bool>(),
    ) {
        let mut vp = Viewport::new();
        vp.set_scale(scale);
        vp.set_offset(ox, oy);
        let pointer = Point::new(px, py);

        let before = vp.screen_to_image(pointer);
        let direction = if zoom_in { ZoomDirection::In } else { ZoomDirection::Out };
        vp.zoom_at(pointer, direction);
        let after = vp.screen_to_image(pointer);

        prop_assert!((before.x - after.x).abs() < 1e-6);
        prop_assert!((before.y - after.y).abs() < 1e-6);
    }

    #[test]
    fn prop_scale_always_in_bounds(
        steps in prop::collection::vec(any::<bool>(), 0..200),
        raw in any::<f64>(),
    ) {
        let mut vp = Viewport::new();
        vp.set_scale(raw);
        prop_assert!(vp.scale() >= MIN_SCALE && vp.scale() <= MAX_SCALE);
        for zoom_in in steps {
            let direction = if zoom_in { ZoomDirection::In } else { ZoomDirection::Out };
            vp.zoom_at(Point::new(50.0, 50.0), direction);
            prop_assert!(vp.scale() >= MIN_SCALE && vp.scale() <= MAX_SCALE);
        }
    }

    #[test]
    fn prop_opacity_and_epsilon_clamped(opacity in any::<f64>(), epsilon in any::<f64>()) {
        let mut store = SessionStore::new();
        store.set_mask_opacity(opacity);
        store.set_simplification_epsilon(epsilon);
        prop_assert!((0.0..=1.0).contains(&store.mask_opacity()));
        prop_assert!((0.0..=10.0).contains(&store.simplification_epsilon()));
    }
}
