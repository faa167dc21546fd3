//!
//! # Ports
//!
//! Named, oriented connection edges on a [crate::Device].
//! Devices are assembled by moving and rotating their instances until ports meet.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::geom::{normalize_angle, Int, Point, Transform, TransformTrait};

/// # Port
///
/// A straight edge of width `width`, centered at `midpoint`, facing outward along `orientation`.
/// Orientations are in degrees counter-clockwise from +x, always normalized into `[0, 360)`.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Port {
    /// Port Name
    pub name: String,
    /// Center of the port edge
    pub midpoint: Point,
    /// Edge width
    pub width: Int,
    /// Outward-facing direction, in degrees
    pub orientation: f64,
}
impl Port {
    /// Create a new [Port]
    pub fn new(name: impl Into<String>, midpoint: Point, width: Int, orientation: f64) -> Self {
        Self {
            name: name.into(),
            midpoint,
            width,
            orientation: normalize_angle(orientation),
        }
    }
    /// Clone with a new name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }
    /// Unit vector pointing along our orientation, as floating point
    pub fn normal(&self) -> (f64, f64) {
        let r = self.orientation.to_radians();
        let (s, c) = r.sin_cos();
        // Keep quarter-turn orientations exact
        (snap_unit(c), snap_unit(s))
    }
    /// The two ends of the port edge.
    /// The first is on the left when looking outward along our orientation.
    pub fn endpoints(&self) -> (Point, Point) {
        let (nx, ny) = self.normal();
        let half = self.width as f64 / 2.;
        let (mx, my) = self.midpoint.to_f64();
        (
            Point::round(mx - ny * half, my + nx * half),
            Point::round(mx + ny * half, my - nx * half),
        )
    }
    /// Clone, rotated by `angle` degrees about our own midpoint.
    /// Only the orientation changes.
    pub fn rotated(&self, angle: f64) -> Self {
        Self {
            orientation: normalize_angle(self.orientation + angle),
            ..self.clone()
        }
    }
    /// Boolean indication of whether our orientation is a multiple of 90 degrees
    pub fn is_manhattan(&self) -> bool {
        self.orientation % 90. == 0.
    }
}
/// Snap values within floating-point noise of -1, 0, or 1 onto them
fn snap_unit(v: f64) -> f64 {
    for target in [-1., 0., 1.] {
        if (v - target).abs() < 1e-12 {
            return target;
        }
    }
    v
}
impl TransformTrait for Port {
    /// Move the midpoint, and rotate the orientation.
    /// Reflections negate the orientation before the rotation is added.
    fn transform(&self, trans: &Transform) -> Self {
        let orientation = if trans.is_reflection() {
            -self.orientation
        } else {
            self.orientation
        };
        Self {
            name: self.name.clone(),
            midpoint: self.midpoint.transform(trans),
            width: self.width,
            orientation: normalize_angle(orientation + trans.angle()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_is_normalized() {
        assert_eq!(Port::new("1", Point::new(0, 0), 10, -90.).orientation, 270.);
        assert_eq!(Port::new("1", Point::new(0, 0), 10, 720.).orientation, 0.);
        assert_eq!(Port::new("1", Point::new(0, 0), 10, 450.).rotated(-180.).orientation, 270.);
    }
    #[test]
    fn normals_and_endpoints() {
        let p = Port::new("E", Point::new(100, 0), 20, 0.);
        assert_eq!(p.normal(), (1., 0.));
        assert_eq!(p.endpoints(), (Point::new(100, 10), Point::new(100, -10)));
        let p = Port::new("N", Point::new(0, 50), 20, 90.);
        assert_eq!(p.normal(), (0., 1.));
        assert_eq!(p.endpoints(), (Point::new(-10, 50), Point::new(10, 50)));
    }
    #[test]
    fn transformed_ports() {
        let p = Port::new("1", Point::new(10, 0), 4, 0.);
        let r = p.transform(&Transform::rotate(90.));
        assert_eq!(r.midpoint, Point::new(0, 10));
        assert_eq!(r.orientation, 90.);
        // Reflection about the x-axis turns a north-facing port south
        let n = Port::new("2", Point::new(0, 5), 4, 90.);
        let f = n.transform(&Transform::reflect_vert());
        assert_eq!(f.midpoint, Point::new(0, -5));
        assert_eq!(f.orientation, 270.);
        // Mirror across the y-axis turns east into west
        let m = Transform::mirror(&Point::new(0, 0), &Point::new(0, 1));
        let w = p.transform(&m);
        assert_eq!(w.midpoint, Point::new(-10, 0));
        assert_eq!(w.orientation, 180.);
    }
}
