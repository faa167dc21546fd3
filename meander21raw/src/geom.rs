//!
//! # Geometry Module
//!
//! Defines the core geometric types including [Point], [Shape], and [Transform],
//! and their core operations.
//!
//! All coordinates are integers, in database units of one nanometer.
//! Device parameters arrive in micrometers and are converted with [um].
//!

// Crates.io
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    bbox::BoundBoxTrait,
    error::{LayoutError, LayoutResult},
};

/// # Location Integer Type-Alias
///
/// Used for all layout spatial coordinates.
///
pub type Int = isize;

/// Database units per micrometer
pub const DB_PER_UM: f64 = 1000.0;

/// Convert a length in micrometers to the nearest database unit
pub fn um(val: f64) -> Int {
    (val * DB_PER_UM).round() as Int
}
/// Convert a length in database units to micrometers
pub fn to_um(val: Int) -> f64 {
    val as f64 / DB_PER_UM
}

/// # Point in two-dimensional layout-space
#[derive(
    Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Point {
    pub x: Int,
    pub y: Int,
}
impl Point {
    /// Create a new [Point] from (x,y) coordinates
    pub fn new(x: Int, y: Int) -> Self {
        Self { x, y }
    }
    /// Create a new [Point] from (x,y) coordinates in micrometers
    pub fn um(x: f64, y: f64) -> Self {
        Self::new(um(x), um(y))
    }
    /// Create a new [Point] from floating-point database units, rounding to the nearest integer
    pub fn round(x: f64, y: f64) -> Self {
        Self::new(x.round() as Int, y.round() as Int)
    }
    /// Create a new [Point] which serves as an offset in direction `dir`
    pub fn offset(val: Int, dir: Dir) -> Self {
        match dir {
            Dir::Horiz => Self { x: val, y: 0 },
            Dir::Vert => Self { x: 0, y: val },
        }
    }
    /// Create a new point shifted by `x` in the x-dimension and by `y` in the y-dimension
    pub fn shift(&self, p: &Point) -> Point {
        Point {
            x: p.x + self.x,
            y: p.y + self.y,
        }
    }
    /// Vector difference `self - p`
    pub fn minus(&self, p: &Point) -> Point {
        Point {
            x: self.x - p.x,
            y: self.y - p.y,
        }
    }
    /// Get the coordinate associated with direction `dir`
    pub fn coord(&self, dir: Dir) -> Int {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }
    /// Convert to a floating-point (x,y) pair, still in database units
    pub fn to_f64(&self) -> (f64, f64) {
        (self.x as f64, self.y as f64)
    }
    /// Create a new [Point], transformed from our original location by `transform`
    /// Coordinate transforms are applied in floating-point format,
    /// largely for rotations, and then rounded to the nearest integer.
    pub fn transform(&self, trans: &Transform) -> Point {
        let (x, y) = trans.apply(self.x as f64, self.y as f64);
        Self::round(x, y)
    }
}
impl From<(Int, Int)> for Point {
    fn from(xy: (Int, Int)) -> Self {
        Self::new(xy.0, xy.1)
    }
}

/// Direction Enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Dir {
    Horiz,
    Vert,
}
impl Dir {
    /// Whichever direction we are, return the other one.
    pub fn other(self) -> Self {
        match self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }
}
impl std::ops::Not for Dir {
    type Output = Self;
    /// Exclamation Operator returns the opposite direction
    fn not(self) -> Self::Output {
        self.other()
    }
}

/// # Path
///
/// Open-ended geometric path with non-zero width.
/// Primarily consists of a series of ordered [Point]s along its centerline.
/// Only Manhattan paths, with each segment horizontal or vertical, can be converted to polygons.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Path {
    pub points: Vec<Point>,
    pub width: usize,
}
impl Path {
    /// Create a new [Path] from centerline `points` and `width`
    pub fn new(points: Vec<Point>, width: usize) -> Self {
        Self { points, width }
    }
}
/// # Polygon
///
/// Closed n-sided polygon with arbitrary number of vertices.
/// Primarily consists of a series of ordered [Point]s.
///
/// Closure from the last point back to the first is implied;
/// the initial point need not be repeated at the end.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Polygon {
    pub points: Vec<Point>,
}
impl Polygon {
    /// Create a new [Polygon] from `points`
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }
    /// Signed area by the shoelace formula, in square database units.
    /// Positive for counter-clockwise polygons.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        let mut twice: i128 = 0;
        for idx in 0..n {
            let (p, q) = (&self.points[idx], &self.points[(idx + 1) % n]);
            twice += p.x as i128 * q.y as i128 - q.x as i128 * p.y as i128;
        }
        twice as f64 / 2.0
    }
    /// Boolean indication of counter-clockwise winding
    pub fn is_ccw(&self) -> bool {
        self.area() > 0.0
    }
    /// Reverse our winding direction, in place
    pub fn reverse(&mut self) {
        self.points.reverse();
    }
}
/// # Rectangle
///
/// Axis-aligned rectangle, specified by two opposite corners.
///
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub p0: Point,
    pub p1: Point,
}
impl Rect {
    /// Create a new [Rect] from two corners, ordered so that `p0` is the lower-left
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }
    /// Calculate our center-point
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2, (self.p0.y + self.p1.y) / 2)
    }
}

/// # Shape
///
/// The primary geometric primitive comprising raw layout.
/// Variants include [Rect], [Polygon], and [Path].
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[enum_dispatch(ShapeTrait)]
pub enum Shape {
    Rect(Rect),
    Polygon(Polygon),
    Path(Path),
}

impl Default for Shape {
    fn default() -> Self {
        Self::Rect(Rect::default())
    }
}

/// # ShapeTrait
///
/// Common shape operations, dispatched from the [Shape] enum to its variants by [enum_dispatch].
///
#[enum_dispatch]
pub trait ShapeTrait {
    /// Retrieve our "origin", or first [Point]
    fn point0(&self) -> &Point;
    /// Indicate whether this shape is (more or less) horizontal or vertical.
    fn orientation(&self) -> Dir;
    /// Shift coordinates by the (x,y) values specified in `pt`
    fn shift(&mut self, pt: &Point);
    /// Boolean indication of whether the [Shape] contains [Point] `pt`.
    /// Containment is *inclusive* for all [Shape] types.
    /// [Point]s on their boundary, which generally include all points specifying the shape itself, are regarded throughout as "inside" the shape.
    fn contains(&self, pt: &Point) -> bool;
    /// Convert to a [Polygon], our most general of shapes
    fn to_poly(&self) -> LayoutResult<Polygon>;
}

impl ShapeTrait for Rect {
    fn point0(&self) -> &Point {
        &self.p0
    }
    fn orientation(&self) -> Dir {
        let (p0, p1) = (&self.p0, &self.p1);
        if (p1.x - p0.x).abs() < (p1.y - p0.y).abs() {
            return Dir::Vert;
        }
        Dir::Horiz
    }
    fn shift(&mut self, pt: &Point) {
        self.p0 = self.p0.shift(pt);
        self.p1 = self.p1.shift(pt);
    }
    fn contains(&self, pt: &Point) -> bool {
        let (p0, p1) = (&self.p0, &self.p1);
        p0.x.min(p1.x) <= pt.x
            && p0.x.max(p1.x) >= pt.x
            && p0.y.min(p1.y) <= pt.y
            && p0.y.max(p1.y) >= pt.y
    }
    fn to_poly(&self) -> LayoutResult<Polygon> {
        // Four-sided, counter-clockwise from the lower-left corner
        let (x0, x1) = (self.p0.x.min(self.p1.x), self.p0.x.max(self.p1.x));
        let (y0, y1) = (self.p0.y.min(self.p1.y), self.p0.y.max(self.p1.y));
        Ok(Polygon::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]))
    }
}
impl ShapeTrait for Polygon {
    fn point0(&self) -> &Point {
        &self.points[0]
    }
    fn orientation(&self) -> Dir {
        let bbox = self.points.bbox();
        if bbox.width() < bbox.height() {
            return Dir::Vert;
        }
        Dir::Horiz
    }
    fn shift(&mut self, pt: &Point) {
        for p in self.points.iter_mut() {
            *p = p.shift(pt);
        }
    }
    fn contains(&self, pt: &Point) -> bool {
        // Fast way out: outside the bounding box is outside the polygon
        if !self.points.bbox().contains(pt) {
            return false;
        }
        // Winding-number test, with boundary points counted as inside
        let mut winding_num: isize = 0;
        for idx in 0..self.points.len() {
            let (past, next) = (
                &self.points[idx],
                &self.points[(idx + 1) % self.points.len()],
            );
            if past.y.min(next.y) <= pt.y && past.y.max(next.y) >= pt.y {
                if next.y == past.y {
                    // Horizontal segment at the point's height: a hit only if it spans `pt.x`
                    if past.x.min(next.x) <= pt.x && past.x.max(next.x) >= pt.x {
                        return true;
                    }
                } else {
                    // Compare in exact integer arithmetic: which side of the edge is `pt`?
                    let cross = (next.x - past.x) as i128 * (pt.y - past.y) as i128
                        - (pt.x - past.x) as i128 * (next.y - past.y) as i128;
                    if cross == 0 {
                        return true;
                    }
                    // Count upward edges with the point on their left, and downward edges with it on their right.
                    // Half-open in y, so that shared vertices are counted once.
                    if next.y > past.y && pt.y < next.y && cross > 0 {
                        winding_num += 1;
                    } else if next.y < past.y && pt.y < past.y && cross < 0 {
                        winding_num -= 1;
                    }
                }
            }
        }
        winding_num != 0
    }
    fn to_poly(&self) -> LayoutResult<Polygon> {
        Ok(self.clone())
    }
}
impl ShapeTrait for Path {
    fn point0(&self) -> &Point {
        &self.points[0]
    }
    fn orientation(&self) -> Dir {
        let bbox = self.points.bbox();
        if bbox.width() < bbox.height() {
            return Dir::Vert;
        }
        Dir::Horiz
    }
    fn shift(&mut self, pt: &Point) {
        for p in self.points.iter_mut() {
            *p = p.shift(pt);
        }
    }
    fn contains(&self, pt: &Point) -> bool {
        match self.to_poly() {
            Ok(poly) => poly.contains(pt),
            Err(_) => false,
        }
    }
    /// Expand into a single outline [Polygon], with square ends.
    /// Each segment is extended by half the width at both of its ends.
    /// Fails for non-Manhattan segments, and for paths which double back on themselves.
    fn to_poly(&self) -> LayoutResult<Polygon> {
        // Drop repeated points, which would produce zero-length segments
        let mut pts: Vec<Point> = Vec::with_capacity(self.points.len());
        for p in self.points.iter() {
            if pts.last() != Some(p) {
                pts.push(*p);
            }
        }
        if pts.len() < 2 {
            return LayoutError::invalid("Path requires at least two distinct points");
        }
        // Odd widths put their extra unit on the left, and at the far end
        let width = self.width as Int;
        let (lo, hi) = (width / 2, width - width / 2);
        // Unit direction of each segment
        let mut dirs: Vec<Point> = Vec::with_capacity(pts.len() - 1);
        for k in 0..pts.len() - 1 {
            let d = pts[k + 1].minus(&pts[k]);
            let dir = match (d.x, d.y) {
                (0, y) => Point::new(0, y.signum()),
                (x, 0) => Point::new(x.signum(), 0),
                _ => return LayoutError::invalid("Unsupported Non-Manhattan Path"),
            };
            if let Some(prev) = dirs.last() {
                if prev.x == -dir.x && prev.y == -dir.y {
                    return LayoutError::invalid("Path doubles back on itself");
                }
            }
            dirs.push(dir);
        }
        // Left-hand normal of each segment
        let normal = |d: &Point| Point::new(-d.y, d.x);
        let scaled = |d: &Point, s: Int| Point::new(d.x * s, d.y * s);

        let mut left = Vec::with_capacity(pts.len());
        let mut right = Vec::with_capacity(pts.len());
        let last = pts.len() - 1;
        for (k, p) in pts.iter().enumerate() {
            let offset = if k == 0 {
                // Start cap: back by half-width, and out along the first segment's normal
                let d = &dirs[0];
                scaled(d, -lo).shift(&scaled(&normal(d), hi))
            } else if k == last {
                let d = &dirs[last - 1];
                scaled(d, hi).shift(&scaled(&normal(d), hi))
            } else {
                let (n0, n1) = (normal(&dirs[k - 1]), normal(&dirs[k]));
                if n0 == n1 {
                    scaled(&n0, hi)
                } else {
                    scaled(&n0.shift(&n1), hi)
                }
            };
            left.push(p.shift(&offset));
            // Mirror the normal component for the right-hand side
            let offset_r = if k == 0 {
                let d = &dirs[0];
                scaled(d, -lo).shift(&scaled(&normal(d), -lo))
            } else if k == last {
                let d = &dirs[last - 1];
                scaled(d, hi).shift(&scaled(&normal(d), -lo))
            } else {
                let (n0, n1) = (normal(&dirs[k - 1]), normal(&dirs[k]));
                if n0 == n1 {
                    scaled(&n0, -lo)
                } else {
                    scaled(&n0.shift(&n1), -lo)
                }
            };
            right.push(p.shift(&offset_r));
        }
        // Right side forward, then left side back: counter-clockwise
        right.extend(left.into_iter().rev());
        Ok(Polygon::new(right))
    }
}

/// # Matrix-Vector Transformation
///
/// 2x2 rotation-matrix and two-entry translation vector,
/// used for relative movement of [Point]s and [Shape]s.
/// Matrices are always orthogonal: rotations, optionally preceded by a reflection.
///
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Rotation / Transformation Matrix
    /// Represented in row-major order
    pub a: [[f64; 2]; 2],
    /// X-Y Translation
    pub b: [f64; 2],
}
impl Transform {
    /// The identity transform, leaving any transformed object unmodified
    pub fn identity() -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [0., 0.],
        }
    }
    /// Translation by (x,y)
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            a: [[1., 0.], [0., 1.]],
            b: [x, y],
        }
    }
    /// A transform to rotate by `angle` degrees, counter-clockwise about the origin
    pub fn rotate(angle: f64) -> Self {
        let (sin, cos) = sin_cos_deg(angle);
        Self {
            a: [[cos, -sin], [sin, cos]],
            b: [0., 0.],
        }
    }
    /// A transform to rotate by `angle` degrees, counter-clockwise about `center`
    pub fn rotate_about(angle: f64, center: &Point) -> Self {
        let (cx, cy) = center.to_f64();
        let to_origin = Self::translate(-cx, -cy);
        let back = Self::translate(cx, cy);
        Self::cascade(&back, &Self::cascade(&Self::rotate(angle), &to_origin))
    }
    /// A transform to reflect about the x-axis
    pub fn reflect_vert() -> Self {
        Self {
            a: [[1., 0.], [0., -1.]],
            b: [0., 0.],
        }
    }
    /// A transform reflecting across the line through `p1` and `p2`.
    /// Coincident points define no line, and produce the identity.
    pub fn mirror(p1: &Point, p2: &Point) -> Self {
        let (x1, y1) = p1.to_f64();
        let (x2, y2) = p2.to_f64();
        let (dx, dy) = (x2 - x1, y2 - y1);
        if dx == 0. && dy == 0. {
            return Self::identity();
        }
        // Reflection across a line at angle phi is a rotation by 2*phi after an x-axis reflection
        let phi = dy.atan2(dx).to_degrees();
        let reflect = Self::cascade(&Self::rotate(2. * phi), &Self::reflect_vert());
        let to_origin = Self::translate(-x1, -y1);
        let back = Self::translate(x1, y1);
        Self::cascade(&back, &Self::cascade(&reflect, &to_origin))
    }
    /// Create a transform from placement fields: location, reflection, and rotation.
    /// Reflection about the x-axis is applied first, then counter-clockwise rotation by `angle` degrees,
    /// then translation to `loc`.
    pub fn from_placement(loc: &Point, reflect_vert: bool, angle: f64) -> Self {
        let (sin, cos) = sin_cos_deg(angle);
        let a = if reflect_vert {
            [[cos, sin], [sin, -cos]]
        } else {
            [[cos, -sin], [sin, cos]]
        };
        let b = [loc.x as f64, loc.y as f64];
        Self { a, b }
    }
    /// Create a new [Transform] that is the cascade of `parent` and `child`.
    ///
    /// "Parents" and "children" refer to typical layout-instance hierarchies,
    /// in which each layer of instance has a nested set of transformations relative to its top-level parent.
    /// The child is applied first.
    ///
    /// Note this operation *is not* commutative.
    /// For example the set of transformations:
    /// * (a) Reflect vertically, then
    /// * (b) Translate by (1,1)
    /// * (c) Place a point at (local coordinate) (1,1)
    /// Lands said point at (2,-2) in top-level space,
    /// whereas reversing the order of (a) and (b) lands it at (2,0).
    ///
    pub fn cascade(parent: &Transform, child: &Transform) -> Transform {
        // The result-transform's origin is the parent's origin,
        // plus the parent-transformed child's origin
        let mut b = matvec(&parent.a, &child.b);
        b[0] += parent.b[0];
        b[1] += parent.b[1];
        // And the cascade-matrix is the product of the parent's and child's
        let a = matmul(&parent.a, &child.a);
        Self { a, b }
    }
    /// Boolean indication of whether we include a reflection
    pub fn is_reflection(&self) -> bool {
        self.a[0][0] * self.a[1][1] - self.a[0][1] * self.a[1][0] < 0.
    }
    /// Rotation angle in degrees, in `[0, 360)`, applied after any reflection
    pub fn angle(&self) -> f64 {
        normalize_angle(self.a[1][0].atan2(self.a[0][0]).to_degrees())
    }
    /// Our translation, rounded to the nearest [Point]
    pub fn offset(&self) -> Point {
        Point::round(self.b[0], self.b[1])
    }
    /// Boolean indication of whether we map axis-aligned rectangles to axis-aligned rectangles
    pub fn is_manhattan(&self) -> bool {
        let a = &self.a;
        (a[0][1].abs() < 1e-12 && a[1][0].abs() < 1e-12)
            || (a[0][0].abs() < 1e-12 && a[1][1].abs() < 1e-12)
    }
    /// Apply to floating-point coordinates (`x`, `y`)
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a[0][0] * x + self.a[0][1] * y + self.b[0],
            self.a[1][0] * x + self.a[1][1] * y + self.b[1],
        )
    }
}
/// Sine and cosine of `angle` degrees.
/// Exact for multiples of 90 degrees, so that quarter-turns never drift off the integer grid.
fn sin_cos_deg(angle: f64) -> (f64, f64) {
    let a = normalize_angle(angle);
    if a == 0. {
        (0., 1.)
    } else if a == 90. {
        (1., 0.)
    } else if a == 180. {
        (0., -1.)
    } else if a == 270. {
        (-1., 0.)
    } else {
        let r = a.to_radians();
        (r.sin(), r.cos())
    }
}
/// Normalize an angle in degrees into `[0, 360)`.
/// Values within a micro-degree of a whole degree are snapped to it.
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % 360.;
    if a < 0. {
        a += 360.;
    }
    let snapped = a.round();
    if (a - snapped).abs() < 1e-6 {
        a = snapped;
    }
    if a >= 360. {
        a -= 360.;
    }
    a
}
/// Multiply 2x2 matrices, returning a new 2x2 matrix
fn matmul(a: &[[f64; 2]; 2], b: &[[f64; 2]; 2]) -> [[f64; 2]; 2] {
    [
        [
            a[0][0] * b[0][0] + a[0][1] * b[1][0],
            a[0][0] * b[0][1] + a[0][1] * b[1][1],
        ],
        [
            a[1][0] * b[0][0] + a[1][1] * b[1][0],
            a[1][0] * b[0][1] + a[1][1] * b[1][1],
        ],
    ]
}
/// Multiply a 2x2 matrix by a 2-entry vector, returning a new 2-entry vector
fn matvec(a: &[[f64; 2]; 2], b: &[f64; 2]) -> [f64; 2] {
    [
        a[0][0] * b[0] + a[0][1] * b[1],
        a[1][0] * b[0] + a[1][1] * b[1],
    ]
}

pub trait TransformTrait {
    /// Apply matrix-vector [Transform] `trans`.
    /// Creates a new object at a location equal to the transformation of our own.
    fn transform(&self, trans: &Transform) -> Self;
}
impl TransformTrait for Point {
    fn transform(&self, trans: &Transform) -> Self {
        Point::transform(self, trans)
    }
}
impl TransformTrait for Shape {
    /// Rectangles stay rectangles under quarter-turns and reflections,
    /// and become [Polygon]s under any other rotation.
    fn transform(&self, trans: &Transform) -> Self {
        match self {
            Shape::Rect(r) if trans.is_manhattan() => Shape::Rect(r.transform(trans)),
            Shape::Rect(r) => Shape::Polygon(Polygon::new(
                vec![
                    r.p0,
                    Point::new(r.p1.x, r.p0.y),
                    r.p1,
                    Point::new(r.p0.x, r.p1.y),
                ]
                .iter()
                .map(|p| p.transform(trans))
                .collect(),
            )),
            Shape::Polygon(p) => Shape::Polygon(p.transform(trans)),
            Shape::Path(p) => Shape::Path(p.transform(trans)),
        }
    }
}
impl TransformTrait for Rect {
    /// Transform both corners, and re-order them lower-left first.
    /// Only meaningful for Manhattan transforms; see [Transform::is_manhattan].
    fn transform(&self, trans: &Transform) -> Self {
        Rect::new(self.p0.transform(trans), self.p1.transform(trans))
    }
}
impl TransformTrait for Polygon {
    fn transform(&self, trans: &Transform) -> Self {
        Polygon {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
        }
    }
}
impl TransformTrait for Path {
    fn transform(&self, trans: &Transform) -> Self {
        Path {
            points: self.points.iter().map(|p| p.transform(trans)).collect(),
            width: self.width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn transform_identity() {
        let shape1 = Shape::Rect(Rect::new(Point::new(0, 0), Point::new(1, 1)));
        let shape2 = shape1.transform(&Transform::identity());
        assert_eq!(shape2, shape1);
    }
    #[test]
    fn transform_rotate() {
        let shape1 = Shape::Rect(Rect::new(Point::new(0, 0), Point::new(2, 1)));
        let trans = Transform::rotate(90.);
        let shape2 = shape1.transform(&trans);
        assert_eq!(
            shape2,
            Shape::Rect(Rect::new(Point::new(-1, 0), Point::new(0, 2)))
        );
        let shape3 = shape2.transform(&trans);
        let shape4 = shape3.transform(&trans);
        let shape0 = shape4.transform(&trans);
        assert_eq!(shape0, shape1);
    }
    #[test]
    fn rotate_off_grid_makes_polygons() {
        let shape = Shape::Rect(Rect::new(Point::new(0, 0), Point::new(1000, 1000)));
        match shape.transform(&Transform::rotate(45.)) {
            Shape::Polygon(p) => {
                assert_eq!(p.points.len(), 4);
                assert_eq!(p.points[2], Point::new(0, 1414));
            }
            _ => panic!("expected a polygon"),
        }
    }
    #[test]
    fn test_cascade1() {
        let trans1 = Transform::reflect_vert();
        let trans2 = Transform::translate(1., 1.);

        let p = Point::new(1, 1);
        let cascade1 = Transform::cascade(&trans1, &trans2);
        let pc1 = p.transform(&cascade1);
        assert_eq!(pc1, Point::new(2, -2));

        let cascade2 = Transform::cascade(&trans2, &trans1);
        let pc1 = p.transform(&cascade2);
        assert_eq!(pc1, Point::new(2, 0));
    }
    #[test]
    fn rotate_about_center() {
        let trans = Transform::rotate_about(90., &Point::new(10, 0));
        assert_eq!(Point::new(20, 0).transform(&trans), Point::new(10, 10));
        assert_eq!(Point::new(10, 0).transform(&trans), Point::new(10, 0));
    }
    #[test]
    fn mirror_across_lines() {
        // Horizontal line y=1: reflects y about 1
        let m = Transform::mirror(&Point::new(0, 1), &Point::new(1, 1));
        assert_eq!(Point::new(3, 4).transform(&m), Point::new(3, -2));
        assert!(m.is_reflection());
        assert_eq!(m.angle(), 0.);
        // The line y=x swaps coordinates
        let m = Transform::mirror(&Point::new(0, 0), &Point::new(5, 5));
        assert_eq!(Point::new(3, 1).transform(&m), Point::new(1, 3));
        assert_eq!(m.angle(), 90.);
    }
    #[test]
    fn placement_roundtrip() {
        for &reflect in &[false, true] {
            for &angle in &[0., 90., 180., 270., 30.] {
                let t = Transform::from_placement(&Point::new(5, -7), reflect, angle);
                assert_eq!(t.is_reflection(), reflect);
                assert!((t.angle() - angle).abs() < 1e-9);
                assert_eq!(t.offset(), Point::new(5, -7));
            }
        }
    }
    #[test]
    fn test_polygon_contains() {
        // Create a right triangle at the origin
        let triangle = Polygon::new(vec![Point::new(0, 0), Point::new(2, 0), Point::new(0, 2)]);
        assert!(triangle.contains(&Point::new(0, 0)));
        assert!(triangle.contains(&Point::new(1, 0)));
        assert!(triangle.contains(&Point::new(2, 0)));
        assert!(triangle.contains(&Point::new(0, 1)));
        assert!(triangle.contains(&Point::new(1, 1)));
        assert!(!triangle.contains(&Point::new(2, 2)));

        // U-shaped polygon inside a 10x10 square
        let u = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(0, 10),
            Point::new(2, 10),
            Point::new(2, 2),
            Point::new(8, 2),
            Point::new(8, 10),
            Point::new(10, 10),
            Point::new(10, 0),
        ]);
        for pt in &u.points {
            assert!(u.contains(pt));
        }
        assert!(u.contains(&Point::new(1, 1)));
        assert!(u.contains(&Point::new(1, 9)));
        assert!(u.contains(&Point::new(9, 9)));
        assert!(u.contains(&Point::new(9, 1)));
        assert!(!u.contains(&Point::new(3, 3)));
        assert!(!u.contains(&Point::new(7, 9)));
        assert!(!u.contains(&Point::new(-1, 5)));
    }
    #[test]
    fn polygon_area() {
        let sq = Rect::new(Point::new(0, 0), Point::new(3, 2)).to_poly().unwrap();
        assert_eq!(sq.area(), 6.0);
        assert!(sq.is_ccw());
        let mut rev = sq.clone();
        rev.reverse();
        assert_eq!(rev.area(), -6.0);
    }
    #[test]
    fn path_to_poly() -> LayoutResult<()> {
        // An L-shaped path, east then north
        let path = Path::new(
            vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10)],
            2,
        );
        let poly = path.to_poly()?;
        assert_eq!(
            poly.points,
            vec![
                Point::new(-1, -1),
                Point::new(11, -1),
                Point::new(11, 11),
                Point::new(9, 11),
                Point::new(9, 1),
                Point::new(-1, 1),
            ]
        );
        assert!(poly.is_ccw());
        // Area: two 12x2 arms sharing a 2x2 corner
        assert_eq!(poly.area(), 44.0);
        // Non-Manhattan segments fail
        let diag = Path::new(vec![Point::new(0, 0), Point::new(5, 5)], 2);
        assert!(diag.to_poly().is_err());
        Ok(())
    }
    #[test]
    fn odd_width_path() -> LayoutResult<()> {
        let path = Path::new(vec![Point::new(0, 0), Point::new(10, 0)], 3);
        let poly = path.to_poly()?;
        assert_eq!(
            poly.points,
            vec![
                Point::new(-1, -1),
                Point::new(12, -1),
                Point::new(12, 2),
                Point::new(-1, 2),
            ]
        );
        // Full width across, and half a width past each end
        assert_eq!(poly.area(), 39.0);
        Ok(())
    }
}
