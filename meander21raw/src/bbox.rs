//!
//! # Rectangular Bounding Boxes and Associated Trait
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::{
    error::{LayoutError, LayoutResult},
    geom::{Int, Path, Point, Polygon, Rect, Shape},
};

/// # Rectangular Bounding Box
///
/// Points `p0` and `p1` represent opposite corners of a bounding rectangle.
/// `p0` is always closest to negative-infinity, in both x and y,
/// and `p1` is always closest to positive-infinity.
///
/// Empty boxes, as returned by [BoundBox::empty], have `p0` beyond `p1`.
/// They act as the identity for [BoundBoxTrait::union].
///
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct BoundBox {
    pub p0: Point,
    pub p1: Point,
}
impl BoundBox {
    /// Create a new [BoundBox] from two [Point]s.
    /// Callers are responsible for ensuring that p0.x <= p1.x, and p0.y <= p1.y.
    fn new(p0: Point, p1: Point) -> Self {
        Self { p0, p1 }
    }
    /// Create a new [BoundBox] from a single [Point].
    /// The resultant [BoundBox] comprises solely the point, having zero area.
    pub fn from_point(pt: Point) -> Self {
        Self { p0: pt, p1: pt }
    }
    /// Create a new [BoundBox] from two points
    pub fn from_points(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }
    /// Create an empty, otherwise invalid [BoundBox]
    pub fn empty() -> Self {
        Self {
            p0: Point::new(Int::MAX, Int::MAX),
            p1: Point::new(Int::MIN, Int::MIN),
        }
    }
    /// Boolean indication of whether a box is empty
    pub fn is_empty(&self) -> bool {
        self.p0.x > self.p1.x || self.p0.y > self.p1.y
    }
    /// Return ourselves if non-empty, or an error naming `what` if empty
    pub fn non_empty(self, what: &str) -> LayoutResult<Self> {
        if self.is_empty() {
            return LayoutError::invalid(format!("{} has an empty bounding box", what));
        }
        Ok(self)
    }
    /// Boolean indication of whether [Point] `pt` lies inside our box.
    pub fn contains(&self, pt: &Point) -> bool {
        self.p0.x <= pt.x && self.p1.x >= pt.x && self.p0.y <= pt.y && self.p1.y >= pt.y
    }
    /// Expand an existing [BoundBox] in all directions by `delta`
    pub fn expand(&mut self, delta: Int) {
        self.p0.x -= delta;
        self.p0.y -= delta;
        self.p1.x += delta;
        self.p1.y += delta;
    }
    /// Get the box's size as an (x,y) tuple
    pub fn size(&self) -> (Int, Int) {
        (self.p1.x - self.p0.x, self.p1.y - self.p0.y)
    }
    /// Width, in the x-dimension
    pub fn width(&self) -> Int {
        self.p1.x - self.p0.x
    }
    /// Height, in the y-dimension
    pub fn height(&self) -> Int {
        self.p1.y - self.p0.y
    }
    /// Center point, rounded towards negative-infinity
    pub fn center(&self) -> Point {
        Point::new(
            (self.p0.x + self.p1.x).div_euclid(2),
            (self.p0.y + self.p1.y).div_euclid(2),
        )
    }
    /// Convert to a [Rect] with the same corners
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.p0, self.p1)
    }
}

///
/// # Bounding Box Trait
///
/// Methods for interacting with [BoundBox]s.
/// Implementations for [Point]s, [Shape]s, and [BoundBox]s
/// enable geometric transformations such as union and intersection.
///
pub trait BoundBoxTrait {
    /// Compute the intersection with rectangular bounding box `bbox`.
    /// Creates and returns a new [BoundBox].
    fn intersection(&self, bbox: &BoundBox) -> BoundBox {
        self.bbox().intersection(bbox)
    }
    /// Compute the union with rectangular bounding box `bbox`.
    /// Creates and returns a new [BoundBox].
    fn union(&self, bbox: &BoundBox) -> BoundBox {
        self.bbox().union(bbox)
    }
    /// Compute a rectangular bounding box around the implementing type.
    fn bbox(&self) -> BoundBox;
}

impl BoundBoxTrait for BoundBox {
    fn intersection(&self, bbox: &BoundBox) -> BoundBox {
        let pmin = Point::new(self.p0.x.max(bbox.p0.x), self.p0.y.max(bbox.p0.y));
        let pmax = Point::new(self.p1.x.min(bbox.p1.x), self.p1.y.min(bbox.p1.y));
        if pmin.x > pmax.x || pmin.y > pmax.y {
            return BoundBox::empty();
        }
        BoundBox::new(pmin, pmax)
    }
    fn union(&self, bbox: &BoundBox) -> BoundBox {
        BoundBox::new(
            Point::new(self.p0.x.min(bbox.p0.x), self.p0.y.min(bbox.p0.y)),
            Point::new(self.p1.x.max(bbox.p1.x), self.p1.y.max(bbox.p1.y)),
        )
    }
    fn bbox(&self) -> BoundBox {
        self.clone()
    }
}

impl BoundBoxTrait for Point {
    fn intersection(&self, bbox: &BoundBox) -> BoundBox {
        if !bbox.contains(self) {
            return BoundBox::empty();
        }
        BoundBox::from_point(*self)
    }
    fn bbox(&self) -> BoundBox {
        BoundBox::from_point(*self)
    }
}

impl BoundBoxTrait for [Point] {
    fn bbox(&self) -> BoundBox {
        let mut bbox = BoundBox::empty();
        for pt in self.iter() {
            bbox = pt.union(&bbox);
        }
        bbox
    }
}

impl BoundBoxTrait for Vec<Point> {
    fn bbox(&self) -> BoundBox {
        self.as_slice().bbox()
    }
}

impl BoundBoxTrait for Rect {
    fn bbox(&self) -> BoundBox {
        BoundBox::from_points(self.p0, self.p1)
    }
}

impl BoundBoxTrait for Polygon {
    fn bbox(&self) -> BoundBox {
        self.points.bbox()
    }
}

impl BoundBoxTrait for Path {
    fn bbox(&self) -> BoundBox {
        let mut bbox = self.points.bbox();
        if !bbox.is_empty() {
            // Square ends extend half the width past each end-point, rounded up
            bbox.expand((self.width - self.width / 2) as Int);
        }
        bbox
    }
}

impl BoundBoxTrait for Shape {
    fn bbox(&self) -> BoundBox {
        match self {
            Shape::Rect(r) => r.bbox(),
            Shape::Polygon(p) => p.bbox(),
            Shape::Path(p) => p.bbox(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_union_identity() {
        let e = BoundBox::empty();
        assert!(e.is_empty());
        let b = BoundBox::from_points(Point::new(3, 4), Point::new(-1, 2));
        assert_eq!(b.p0, Point::new(-1, 2));
        assert_eq!(b.p1, Point::new(3, 4));
        assert_eq!(e.union(&b), b);
        assert!(e.clone().non_empty("nothing").is_err());
    }
    #[test]
    fn intersections() {
        let a = BoundBox::from_points(Point::new(0, 0), Point::new(10, 10));
        let b = BoundBox::from_points(Point::new(5, 5), Point::new(20, 20));
        let i = a.intersection(&b);
        assert_eq!(i, BoundBox::from_points(Point::new(5, 5), Point::new(10, 10)));
        let c = BoundBox::from_points(Point::new(11, 11), Point::new(20, 20));
        assert!(a.intersection(&c).is_empty());
        assert!(Point::new(50, 50).intersection(&a).is_empty());
    }
    #[test]
    fn sizes_and_centers() {
        let b = BoundBox::from_points(Point::new(-3, 0), Point::new(4, 10));
        assert_eq!(b.size(), (7, 10));
        assert_eq!(b.width(), 7);
        assert_eq!(b.height(), 10);
        assert_eq!(b.center(), Point::new(0, 5));
    }
    #[test]
    fn shape_boxes() {
        let path = Shape::Path(Path::new(vec![Point::new(0, 0), Point::new(10, 0)], 4));
        assert_eq!(
            path.bbox(),
            BoundBox::from_points(Point::new(-2, -2), Point::new(12, 2))
        );
        let poly = Shape::Polygon(Polygon::new(vec![
            Point::new(0, 0),
            Point::new(5, -5),
            Point::new(10, 7),
        ]));
        assert_eq!(
            poly.bbox(),
            BoundBox::from_points(Point::new(0, -5), Point::new(10, 7))
        );
    }
}
