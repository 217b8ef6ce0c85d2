//! Viewport and coordinate transformation for the annotation canvas.
//!
//! Maps between screen space (pixels of the rendering surface) and image space
//! (pixels of the source image). Both spaces have their origin top-left with
//! +Y down, so the mapping is a uniform scale plus a translation:
//!
//! ```text
//! screen = image * scale + offset
//! image  = (screen - offset) / scale
//! ```

use std::fmt;

use maskkit_core::constants::{clamp_scale, FIT_MARGIN, MAX_SCALE, MIN_SCALE, ZOOM_STEP};
use maskkit_core::{ImageSize, Point};
use serde::{Deserialize, Serialize};

/// Direction of one zoom notch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Direction for a wheel delta; negative deltas (scroll up) zoom in.
    pub fn from_wheel_delta(delta_y: f64) -> Self {
        if delta_y < 0.0 {
            Self::In
        } else {
            Self::Out
        }
    }
}

/// Scale and pan limits applied by the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportLimits {
    pub min_scale: f64,
    pub max_scale: f64,
    pub zoom_step: f64,
    pub fit_margin: f64,
}

impl ViewportLimits {
    /// Limits with the scale bounds forced into the global `[0.1, 5.0]` range.
    pub fn sanitized(self) -> Self {
        let min_scale = clamp_scale(self.min_scale);
        let max_scale = clamp_scale(self.max_scale).max(min_scale);
        let zoom_step = if self.zoom_step.is_finite() && self.zoom_step > 1.0 {
            self.zoom_step
        } else {
            ZOOM_STEP
        };
        let fit_margin = if self.fit_margin.is_finite() {
            self.fit_margin.max(0.0)
        } else {
            FIT_MARGIN
        };
        Self {
            min_scale,
            max_scale,
            zoom_step,
            fit_margin,
        }
    }
}

impl Default for ViewportLimits {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            max_scale: MAX_SCALE,
            zoom_step: ZOOM_STEP,
            fit_margin: FIT_MARGIN,
        }
    }
}

/// Viewport transformation state (scale and pan offset).
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    limits: ViewportLimits,
}

impl Viewport {
    /// Creates an identity viewport with default limits.
    pub fn new() -> Self {
        Self::with_limits(ViewportLimits::default())
    }

    pub fn with_limits(limits: ViewportLimits) -> Self {
        let limits = limits.sanitized();
        Self {
            scale: 1.0_f64.clamp(limits.min_scale, limits.max_scale),
            offset_x: 0.0,
            offset_y: 0.0,
            limits,
        }
    }

    /// Gets the current scale (1.0 = one screen pixel per image pixel).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Gets the pan offset: where image-space origin lands on screen.
    pub fn offset(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }

    pub fn limits(&self) -> &ViewportLimits {
        &self.limits
    }

    /// Sets the scale, clamped to the configured bounds.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = self.clamp(scale);
    }

    /// Sets the pan offset directly.
    pub fn set_offset(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.offset_x = x;
            self.offset_y = y;
        }
    }

    /// Fits the image into the container and centers it.
    ///
    /// The image is never magnified beyond 1:1 by a fit. Invalid sizes leave
    /// the viewport untouched.
    pub fn fit_to_image(&mut self, image: ImageSize, container: ImageSize) {
        if !image.is_valid() || !container.width.is_finite() || !container.height.is_finite() {
            return;
        }

        let margin = self.limits.fit_margin;
        let scale_x = (container.width - margin) / image.width;
        let scale_y = (container.height - margin) / image.height;
        let scale = self.clamp(scale_x.min(scale_y).min(1.0));

        self.scale = scale;
        self.offset_x = (container.width - image.width * scale) / 2.0;
        self.offset_y = (container.height - image.height * scale) / 2.0;
        tracing::debug!("Fit {}x{} image: {}", image.width, image.height, self);
    }

    /// Converts a screen point to image space.
    pub fn screen_to_image(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }

    /// Converts an image point to screen space.
    pub fn image_to_screen(&self, image: Point) -> Point {
        Point::new(
            image.x * self.scale + self.offset_x,
            image.y * self.scale + self.offset_y,
        )
    }

    /// Zooms one notch around `pointer`, keeping the image point under it fixed.
    pub fn zoom_at(&mut self, pointer: Point, direction: ZoomDirection) {
        let target = match direction {
            ZoomDirection::In => self.scale * self.limits.zoom_step,
            ZoomDirection::Out => self.scale / self.limits.zoom_step,
        };
        self.zoom_to(pointer, target);
    }

    /// Sets the scale while keeping the image point under `pointer` fixed.
    pub fn zoom_to(&mut self, pointer: Point, scale: f64) {
        if !pointer.is_finite() {
            return;
        }
        let anchor = self.screen_to_image(pointer);
        let new_scale = self.clamp(scale);

        // offset' = pointer - anchor * scale'
        self.scale = new_scale;
        self.offset_x = pointer.x - anchor.x * new_scale;
        self.offset_y = pointer.y - anchor.y * new_scale;
    }

    /// Pans by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.offset_x += dx;
            self.offset_y += dy;
        }
    }

    /// Resets to 1:1 with the image origin at the screen origin.
    pub fn reset(&mut self) {
        self.scale = self.clamp(1.0);
        self.offset_x = 0.0;
        self.offset_y = 0.0;
    }

    fn clamp(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            return self.scale;
        }
        scale.clamp(self.limits.min_scale, self.limits.max_scale)
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scale: {:.2}x | Offset: ({:.1}, {:.1})",
            self.scale, self.offset_x, self.offset_y
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}
