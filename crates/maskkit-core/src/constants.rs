//! Shared numeric limits and defaults.

/// Smallest allowed viewport scale.
pub const MIN_SCALE: f64 = 0.1;

/// Largest allowed viewport scale.
pub const MAX_SCALE: f64 = 5.0;

/// Multiplicative step applied by one zoom notch.
pub const ZOOM_STEP: f64 = 1.1;

/// Screen-space margin (pixels) reserved around the image when fitting.
pub const FIT_MARGIN: f64 = 40.0;

/// Minimum width and height (image units) of a box gesture.
pub const MIN_BOX_SIZE: f64 = 10.0;

/// Minimum number of vertices of a lasso stroke or polygon ring.
pub const MIN_RING_POINTS: usize = 3;

/// Number of snapshots retained by the undo history.
pub const HISTORY_CAPACITY: usize = 50;

/// Default polygon simplification tolerance sent to the oracle.
pub const DEFAULT_SIMPLIFICATION_EPSILON: f64 = 2.0;

/// Upper bound of the simplification tolerance.
pub const MAX_SIMPLIFICATION_EPSILON: f64 = 10.0;

/// Default opacity of rendered masks.
pub const DEFAULT_MASK_OPACITY: f64 = 0.5;

/// Clamps a simplification tolerance into `[0, MAX_SIMPLIFICATION_EPSILON]`.
///
/// Non-finite input falls back to the default tolerance.
pub fn clamp_epsilon(epsilon: f64) -> f64 {
    if epsilon.is_nan() {
        return DEFAULT_SIMPLIFICATION_EPSILON;
    }
    epsilon.clamp(0.0, MAX_SIMPLIFICATION_EPSILON)
}

/// Clamps a mask opacity into `[0, 1]`.
pub fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        return DEFAULT_MASK_OPACITY;
    }
    opacity.clamp(0.0, 1.0)
}

/// Clamps a viewport scale into `[MIN_SCALE, MAX_SCALE]`.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}
