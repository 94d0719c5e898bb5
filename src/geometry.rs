//! Planar geometry primitives used by the mesh pipeline
//!
//! Points, the generation extent, quantized vertex keys and canonical edges,
//! plus the few polygon routines the Voronoi and relaxation code share.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Size of the quantization grid used to compare vertices (in map units)
pub const VERTEX_QUANTUM: f64 = 1e-6;

/// Cross-product accumulations below this are treated as zero-area polygons
pub const AREA_EPSILON: f64 = 1e-9;

// =============================================================================
// POINTS
// =============================================================================

/// A 2D coordinate in map space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Quantized key for exact comparison and hashing.
    pub fn key(&self) -> VertexKey {
        VertexKey::from_point(self)
    }
}

/// Width and height of the generation area. The area spans `[0,width]x[0,height]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when the extent encloses no area (zero, negative or non-finite sides).
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }

    pub fn area(&self) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            self.width * self.height
        }
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// The extent rectangle as a counter-clockwise polygon.
    pub fn to_polygon(&self) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(self.width, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ]
    }
}

// =============================================================================
// VERTEX KEYS & EDGES
// =============================================================================

/// A vertex position snapped to the `VERTEX_QUANTUM` grid.
///
/// Ordered lexicographically, x first, then y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey {
    pub x: i64,
    pub y: i64,
}

impl VertexKey {
    pub fn from_point(p: &Point) -> Self {
        Self {
            x: (p.x / VERTEX_QUANTUM).round() as i64,
            y: (p.y / VERTEX_QUANTUM).round() as i64,
        }
    }

    /// The 3x3 block of keys centred on this one.
    pub fn neighborhood(&self) -> impl Iterator<Item = VertexKey> + '_ {
        (-1i64..=1).flat_map(move |dy| {
            (-1i64..=1).map(move |dx| VertexKey {
                x: self.x + dx,
                y: self.y + dy,
            })
        })
    }
}

/// An undirected polygon edge with its endpoints in canonical order.
///
/// Two edges covering the same segment compare equal whatever the winding of
/// the polygons they came from.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Edge {
    start: Point,
    end: Point,
}

impl Edge {
    pub fn new(a: Point, b: Point) -> Self {
        if b.key() < a.key() {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn keys(&self) -> (VertexKey, VertexKey) {
        (self.start.key(), self.end.key())
    }

    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    /// True when both endpoints quantize to the same key.
    pub fn is_degenerate(&self) -> bool {
        self.start.key() == self.end.key()
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.keys() == other.keys()
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.keys().hash(state);
    }
}

impl PartialOrd for Edge {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Edge {
    fn cmp(&self, other: &Self) -> Ordering {
        self.keys().cmp(&other.keys())
    }
}

/// Canonical edges of a closed polygon (last vertex connects to the first).
pub fn polygon_edges(polygon: &[Point]) -> Vec<Edge> {
    let n = polygon.len();
    if n < 2 {
        return Vec::new();
    }

    (0..n)
        .map(|i| Edge::new(polygon[i], polygon[(i + 1) % n]))
        .filter(|e| !e.is_degenerate())
        .collect()
}

// =============================================================================
// POLYGON ROUTINES
// =============================================================================

/// Signed area of a polygon (positive for counter-clockwise winding).
pub fn polygon_area(polygon: &[Point]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }

    let mut twice_area = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        twice_area += a.x * b.y - b.x * a.y;
    }
    twice_area * 0.5
}

/// Area-weighted centroid via the shoelace accumulation.
///
/// Accumulates the cross products `k` and the weighted sums `x`, `y`; the
/// centroid is `(x / 3k, y / 3k)`. Returns `None` for polygons with fewer than
/// three vertices or near-zero area.
pub fn polygon_centroid(polygon: &[Point]) -> Option<Point> {
    let n = polygon.len();
    if n < 3 {
        return None;
    }

    let mut k = 0.0;
    let mut x = 0.0;
    let mut y = 0.0;
    let mut b = polygon[n - 1];
    for &vertex in polygon {
        let a = b;
        b = vertex;
        let c = a.x * b.y - b.x * a.y;
        k += c;
        x += (a.x + b.x) * c;
        y += (a.y + b.y) * c;
    }

    if k.abs() < AREA_EPSILON {
        return None;
    }

    let k = k * 3.0;
    let centroid = Point::new(x / k, y / k);
    centroid.is_finite().then_some(centroid)
}

/// Clip a convex polygon to the half-plane `{ p : (p - origin) . normal <= 0 }`.
///
/// Sutherland-Hodgman against a single line; vertex order is preserved.
pub fn clip_half_plane(polygon: &[Point], origin: Point, normal: (f64, f64)) -> Vec<Point> {
    let n = polygon.len();
    if n == 0 {
        return Vec::new();
    }

    let side = |p: &Point| (p.x - origin.x) * normal.0 + (p.y - origin.y) * normal.1;

    let mut clipped = Vec::with_capacity(n + 1);
    for i in 0..n {
        let current = polygon[i];
        let next = polygon[(i + 1) % n];
        let d_current = side(&current);
        let d_next = side(&next);

        if d_current <= 0.0 {
            clipped.push(current);
        }

        // Edge crosses the clipping line
        if (d_current < 0.0 && d_next > 0.0) || (d_current > 0.0 && d_next < 0.0) {
            let t = d_current / (d_current - d_next);
            clipped.push(Point::new(
                current.x + t * (next.x - current.x),
                current.y + t * (next.y - current.y),
            ));
        }
    }
    clipped
}
