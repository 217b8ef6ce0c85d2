//! Plane geometry shared by the viewport, the lasso editor and the data model.
//!
//! All coordinates are `f64`. Rings are implicitly closed: a trailing vertex
//! equal to the first one is tolerated but never required.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 2D point in image or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Returns true if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// An ordered, implicitly closed sequence of vertices.
pub type Ring = Vec<Point>;

/// Serde adapter that writes a ring as `[[x, y], ...]`.
///
/// Used for polygon fields, which travel as coordinate pairs rather than
/// `{x, y}` objects.
pub mod pairs {
    use super::*;

    pub fn serialize<S>(ring: &[Point], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let pairs: Vec<[f64; 2]> = ring.iter().map(|p| [p.x, p.y]).collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Ring, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(|[x, y]| Point::new(x, y)).collect())
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    /// Creates a new image size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both extents are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Inclusive containment test against `[0, width] x [0, height]`.
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }
}

/// Axis-aligned rectangle in image space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BoundingBox {
    /// Creates a bounding box from explicit extents.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Builds the normalized rectangle spanned by two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x_min: a.x.min(b.x),
            y_min: a.y.min(b.y),
            x_max: a.x.max(b.x),
            y_max: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// True when both extents strictly exceed `min_size`.
    pub fn exceeds(&self, min_size: f64) -> bool {
        self.width() > min_size && self.height() > min_size
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x_min
            && point.x <= self.x_max
            && point.y >= self.y_min
            && point.y <= self.y_max
    }

    /// Clamps every edge into `[0, width] x [0, height]`.
    pub fn clamp_to(&self, size: ImageSize) -> Self {
        Self {
            x_min: self.x_min.clamp(0.0, size.width),
            y_min: self.y_min.clamp(0.0, size.height),
            x_max: self.x_max.clamp(0.0, size.width),
            y_max: self.y_max.clamp(0.0, size.height),
        }
    }

    /// Counter-clockwise ring of the four corners.
    pub fn to_ring(&self) -> Ring {
        vec![
            Point::new(self.x_min, self.y_min),
            Point::new(self.x_max, self.y_min),
            Point::new(self.x_max, self.y_max),
            Point::new(self.x_min, self.y_max),
        ]
    }
}

/// Signed area of a ring using the shoelace formula.
///
/// Positive for counter-clockwise winding in a y-up frame. Rings with fewer
/// than three vertices have zero area.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[(i + 1) % ring.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    sum / 2.0
}

/// Absolute area of a ring.
pub fn area(ring: &[Point]) -> f64 {
    signed_area(ring).abs()
}

/// Axis-aligned bounds of a ring, or `None` for an empty ring.
pub fn bounds(ring: &[Point]) -> Option<BoundingBox> {
    let first = ring.first()?;
    let init = BoundingBox::new(first.x, first.y, first.x, first.y);
    Some(ring.iter().skip(1).fold(init, |b, p| BoundingBox {
        x_min: b.x_min.min(p.x),
        y_min: b.y_min.min(p.y),
        x_max: b.x_max.max(p.x),
        y_max: b.y_max.max(p.y),
    }))
}

/// Divides every coordinate by the image extents.
pub fn normalize(ring: &[Point], size: ImageSize) -> Ring {
    ring.iter()
        .map(|p| Point::new(p.x / size.width, p.y / size.height))
        .collect()
}

/// Multiplies every normalized coordinate by the image extents.
pub fn denormalize(ring: &[Point], size: ImageSize) -> Ring {
    ring.iter()
        .map(|p| Point::new(p.x * size.width, p.y * size.height))
        .collect()
}

/// True when the last vertex repeats the first.
pub fn is_closed(ring: &[Point]) -> bool {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) => ring.len() > 1 && first == last,
        _ => false,
    }
}

/// Returns the ring with its first vertex appended, unless already closed.
pub fn close_ring(ring: &[Point]) -> Ring {
    let mut closed = ring.to_vec();
    if let Some(first) = ring.first() {
        if !is_closed(ring) {
            closed.push(*first);
        }
    }
    closed
}

/// Returns the ring without a trailing duplicate of the first vertex.
pub fn open_ring(ring: &[Point]) -> Ring {
    let mut open = ring.to_vec();
    if is_closed(ring) {
        open.pop();
    }
    open
}

/// Point-in-polygon test using ray casting.
pub fn contains_point(ring: &[Point], point: &Point) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (pi, pj) = (ring[i], ring[j]);
        if ((pi.y > point.y) != (pj.y > point.y))
            && (point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
