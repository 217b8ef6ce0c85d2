//! Polygon boolean editing driven by freehand lasso strokes.
//!
//! A stroke is unioned into (add) or cut out of (subtract) the selected
//! object's polygon. Objects are single simple rings, so a result with several
//! components or holes is collapsed by a [`PolygonCombiner`] policy. The
//! default policy, [`CsgLargestRing`], keeps the ring with the greatest
//! absolute area and drops everything else, including every hole.

use csgrs::sketch::Sketch;
use csgrs::traits::CSG;
use maskkit_core::constants::MIN_RING_POINTS;
use maskkit_core::geometry::{self, ImageSize, Point, Ring};
use maskkit_core::{AnnotationObject, GeometryError, LassoMode};

/// Combines a subject polygon with a stroke ring into one ring.
pub trait PolygonCombiner: Send + Sync {
    fn combine(
        &self,
        subject: &[Point],
        stroke: &[Point],
        mode: LassoMode,
    ) -> Result<Ring, GeometryError>;
}

/// Exact clipping through `csgrs`, collapsed to the largest output ring.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsgLargestRing;

impl PolygonCombiner for CsgLargestRing {
    fn combine(
        &self,
        subject: &[Point],
        stroke: &[Point],
        mode: LassoMode,
    ) -> Result<Ring, GeometryError> {
        let subject = to_sketch(subject)?;
        let stroke = to_sketch(&geometry::close_ring(stroke))?;

        let result = match mode {
            LassoMode::Add => subject.union(&stroke),
            LassoMode::Subtract => subject.difference(&stroke),
        };

        largest_ring(&result).ok_or_else(|| GeometryError::EmptyResult {
            operation: mode.to_string(),
        })
    }
}

fn to_sketch(ring: &[Point]) -> Result<Sketch<()>, GeometryError> {
    let open = geometry::open_ring(ring);
    if open.len() < MIN_RING_POINTS {
        return Err(GeometryError::TooFewPoints {
            count: open.len(),
            required: MIN_RING_POINTS,
        });
    }
    if !open.iter().all(Point::is_finite) {
        return Err(GeometryError::NonFiniteCoordinate);
    }
    let pts: Vec<[f64; 2]> = open.iter().map(|p| [p.x, p.y]).collect();
    Ok(Sketch::polygon(&pts, None))
}

/// Picks the ring with the greatest `|signed area|` across every component,
/// exteriors and interiors alike.
fn largest_ring(sketch: &Sketch<()>) -> Option<Ring> {
    let mp = sketch.to_multipolygon();
    let mut best: Option<(f64, Ring)> = None;

    for poly in mp.0.iter() {
        let rings = std::iter::once(poly.exterior()).chain(poly.interiors().iter());
        for ring in rings {
            let points: Ring = ring.0.iter().map(|c| Point::new(c.x, c.y)).collect();
            let points = geometry::open_ring(&points);
            if points.len() < MIN_RING_POINTS {
                continue;
            }
            let area = geometry::area(&points);
            if area > 0.0 && best.as_ref().is_none_or(|(a, _)| area > *a) {
                best = Some((area, points));
            }
        }
    }

    best.map(|(_, ring)| ring)
}

/// Applies a stroke to `object` in place.
///
/// On success the polygon, its normalized mirror and the clamped bbox are
/// replaced together. On failure the object is left untouched.
pub fn apply_lasso(
    combiner: &dyn PolygonCombiner,
    object: &mut AnnotationObject,
    stroke: &[Point],
    mode: LassoMode,
    size: ImageSize,
) -> Result<(), GeometryError> {
    if !size.is_valid() {
        return Err(GeometryError::InvalidImageSize {
            width: size.width,
            height: size.height,
        });
    }
    let ring = combiner.combine(&object.polygon, stroke, mode)?;
    tracing::debug!(
        "Lasso {} on {}: {} -> {} vertices",
        mode,
        object.id,
        object.polygon.len(),
        ring.len()
    );
    object.set_polygon(ring, size);
    Ok(())
}
