//! Gesture state machine.
//!
//! Interprets pointer and keyboard input into one of four states and, when a
//! gesture completes, an [`Effect`] for the session store to apply. The machine
//! never mutates annotation state itself; everything it needs to decide is
//! passed in through a [`GestureContext`].
//!
//! ```text
//!            secondary / middle / primary+space
//!   any ─────────────────────────────────────────▶ Panning ──release──▶ Idle
//!   Idle ──primary, boundingBox, in image──▶ DrawingBox ──release──▶ Idle
//!   Idle ──primary, lasso, selection─────▶ DrawingLasso ──release──▶ Idle
//! ```

use maskkit_core::constants::{MIN_BOX_SIZE, MIN_RING_POINTS};
use maskkit_core::{
    AnnotationObject, BoundingBox, ImageSize, LassoMode, ObjectId, Point, Ring, ToolMode,
};
use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;

/// Pointer buttons the machine distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Modifier keys held during a pointer press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    /// Adds a positive refinement point in select mode.
    pub shift: bool,
    /// Adds a negative refinement point in select mode.
    pub alt: bool,
}

/// Keys the machine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureKey {
    /// Abandons the gesture in progress.
    Escape,
    /// Held to turn primary presses into pans.
    Space,
}

/// A pointer event in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Current gesture. Transient, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    /// Last pointer position in screen space.
    Panning { last: Point },
    /// Corners in image space.
    DrawingBox { anchor: Point, current: Point },
    /// Accumulated stroke in image space.
    DrawingLasso { points: Ring },
}

/// Outcome of a pointer event, consumed by the session store.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Request a new object for a box.
    CreateObject(BoundingBox),
    /// Apply a lasso stroke to an existing object.
    EditObject {
        id: ObjectId,
        stroke: Ring,
        mode: LassoMode,
    },
    /// Refine an existing object with one more click point.
    AddPoint {
        id: ObjectId,
        point: Point,
        positive: bool,
    },
    /// Change the selection.
    Select(Option<ObjectId>),
    /// Move the viewport by a screen-space delta.
    Pan { dx: f64, dy: f64 },
}

/// Read-only view of the state a gesture decision depends on.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub viewport: &'a Viewport,
    pub tool: ToolMode,
    pub lasso: LassoMode,
    pub selected: Option<&'a ObjectId>,
    /// `None` while no image is active.
    pub image_size: Option<ImageSize>,
    /// Objects in draw order; later objects are on top.
    pub objects: &'a [AnnotationObject],
}

/// Pointer/keyboard interpreter.
#[derive(Debug, Clone)]
pub struct GestureMachine {
    state: GestureState,
    pan_modifier: bool,
    min_box_size: f64,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::with_min_box_size(MIN_BOX_SIZE)
    }

    /// Machine that only accepts boxes strictly larger than `min_box_size`.
    pub fn with_min_box_size(min_box_size: f64) -> Self {
        Self {
            state: GestureState::Idle,
            pan_modifier: false,
            min_box_size: if min_box_size.is_finite() {
                min_box_size.max(0.0)
            } else {
                MIN_BOX_SIZE
            },
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == GestureState::Idle
    }

    pub fn min_box_size(&self) -> f64 {
        self.min_box_size
    }

    /// Abandons any gesture in progress.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            tracing::debug!("Gesture cancelled");
        }
        self.state = GestureState::Idle;
    }

    pub fn on_key_down(&mut self, key: GestureKey) {
        match key {
            GestureKey::Escape => self.cancel(),
            GestureKey::Space => self.pan_modifier = true,
        }
    }

    pub fn on_key_up(&mut self, key: GestureKey) {
        if key == GestureKey::Space {
            self.pan_modifier = false;
        }
    }

    pub fn on_pointer_down(&mut self, event: PointerEvent, ctx: &GestureContext<'_>) -> Effect {
        if self.starts_pan(&event) {
            if matches!(
                self.state,
                GestureState::DrawingBox { .. } | GestureState::DrawingLasso { .. }
            ) {
                tracing::debug!("Drawing abandoned for pan");
            }
            self.state = GestureState::Panning {
                last: event.position,
            };
            return Effect::None;
        }

        if event.button != PointerButton::Primary || !self.is_idle() {
            return Effect::None;
        }
        let Some(size) = ctx.image_size else {
            return Effect::None;
        };
        let point = ctx.viewport.screen_to_image(event.position);

        match ctx.tool {
            ToolMode::BoundingBox => {
                if size.contains(&point) {
                    self.state = GestureState::DrawingBox {
                        anchor: point,
                        current: point,
                    };
                }
                Effect::None
            }
            ToolMode::Lasso => {
                if ctx.selected.is_some() {
                    let mut points = Vec::new();
                    if size.contains(&point) {
                        points.push(point);
                    }
                    self.state = GestureState::DrawingLasso { points };
                }
                Effect::None
            }
            ToolMode::Select => Self::select_press(event.modifiers, point, size, ctx),
        }
    }

    pub fn on_pointer_move(&mut self, position: Point, ctx: &GestureContext<'_>) -> Effect {
        match &mut self.state {
            GestureState::Idle => Effect::None,
            GestureState::Panning { last } => {
                let (dx, dy) = (position.x - last.x, position.y - last.y);
                *last = position;
                if dx == 0.0 && dy == 0.0 {
                    Effect::None
                } else {
                    Effect::Pan { dx, dy }
                }
            }
            GestureState::DrawingBox { current, .. } => {
                *current = ctx.viewport.screen_to_image(position);
                Effect::None
            }
            GestureState::DrawingLasso { points } => {
                let point = ctx.viewport.screen_to_image(position);
                let in_bounds = ctx.image_size.is_some_and(|size| size.contains(&point));
                if in_bounds && points.last() != Some(&point) {
                    points.push(point);
                }
                Effect::None
            }
        }
    }

    pub fn on_pointer_up(&mut self, event: PointerEvent, ctx: &GestureContext<'_>) -> Effect {
        // Release position counts as the final motion sample.
        if matches!(
            self.state,
            GestureState::DrawingBox { .. } | GestureState::DrawingLasso { .. }
        ) {
            self.on_pointer_move(event.position, ctx);
        }

        match std::mem::replace(&mut self.state, GestureState::Idle) {
            GestureState::Idle | GestureState::Panning { .. } => Effect::None,
            GestureState::DrawingBox { anchor, current } => {
                let Some(size) = ctx.image_size else {
                    return Effect::None;
                };
                let bbox = BoundingBox::from_corners(anchor, current).clamp_to(size);
                if bbox.exceeds(self.min_box_size) {
                    Effect::CreateObject(bbox)
                } else {
                    tracing::debug!(
                        "Box {:.1}x{:.1} too small, discarded",
                        bbox.width(),
                        bbox.height()
                    );
                    Effect::None
                }
            }
            GestureState::DrawingLasso { points } => match ctx.selected {
                Some(id) if points.len() >= MIN_RING_POINTS => Effect::EditObject {
                    id: id.clone(),
                    stroke: points,
                    mode: ctx.lasso,
                },
                _ => {
                    tracing::debug!("Lasso stroke with {} points discarded", points.len());
                    Effect::None
                }
            },
        }
    }

    fn starts_pan(&self, event: &PointerEvent) -> bool {
        match event.button {
            PointerButton::Secondary | PointerButton::Middle => true,
            PointerButton::Primary => self.pan_modifier,
        }
    }

    fn select_press(
        modifiers: Modifiers,
        point: Point,
        size: ImageSize,
        ctx: &GestureContext<'_>,
    ) -> Effect {
        if modifiers.shift || modifiers.alt {
            return match ctx.selected {
                Some(id) if size.contains(&point) => Effect::AddPoint {
                    id: id.clone(),
                    point,
                    positive: !modifiers.alt,
                },
                _ => Effect::None,
            };
        }

        let hit = ctx
            .objects
            .iter()
            .rev()
            .find(|o| o.contains_point(&point))
            .map(|o| o.id.clone());
        if hit.as_ref() == ctx.selected {
            Effect::None
        } else {
            Effect::Select(hit)
        }
    }
}

impl Default for GestureMachine {
    fn default() -> Self {
        Self::new()
    }
}
