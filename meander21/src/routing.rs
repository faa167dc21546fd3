//!
//! # Manhattan Routing
//!

// Crates.io
use tracing::debug;

// Local imports
use crate::raw::{union, Device, Int, LayerSpec, LayoutError, LayoutResult, Point, Polygon, Port};

/// Unit direction of Manhattan port `port`, as integers
fn unit(port: &Port) -> Point {
    let (nx, ny) = port.normal();
    Point::new(nx.round() as Int, ny.round() as Int)
}
/// Projection of `v` onto unit direction `dir`
fn along(v: &Point, dir: &Point) -> Int {
    v.x * dir.x + v.y * dir.y
}
fn scaled(p: &Point, s: Int) -> Point {
    Point::new(p.x * s, p.y * s)
}

/// Centerline from `port1` to `port2`, leaving each along its orientation
fn centerline(port1: &Port, port2: &Port, width: Int) -> LayoutResult<Vec<Point>> {
    let (a, b) = (port1.midpoint, port2.midpoint);
    let (d1, d2) = (unit(port1), unit(port2));
    let pts = match along(&d1, &d2) {
        0 => {
            // Perpendicular: a single bend where the two rays meet
            let corner = if d1.y == 0 {
                Point::new(b.x, a.y)
            } else {
                Point::new(a.x, b.y)
            };
            if along(&corner.minus(&a), &d1) < 0 || along(&corner.minus(&b), &d2) < 0 {
                return LayoutError::invalid(format!(
                    "Cannot route ports `{}` and `{}` with a single bend",
                    port1.name, port2.name
                ));
            }
            vec![a, corner, b]
        }
        -1 => {
            // Facing each other: a Z through the midway line
            if along(&b.minus(&a), &d1) <= 0 {
                return LayoutError::invalid(format!(
                    "Ports `{}` and `{}` face away from each other",
                    port1.name, port2.name
                ));
            }
            if d1.y == 0 {
                let xm = (a.x + b.x).div_euclid(2);
                vec![a, Point::new(xm, a.y), Point::new(xm, b.y), b]
            } else {
                let ym = (a.y + b.y).div_euclid(2);
                vec![a, Point::new(a.x, ym), Point::new(b.x, ym), b]
            }
        }
        _ => {
            // Same direction: a U reaching one width beyond the farther port
            if along(&b.minus(&a), &Point::new(-d1.y, d1.x)) == 0 {
                return LayoutError::invalid(format!(
                    "Ports `{}` and `{}` are co-linear and co-directed",
                    port1.name, port2.name
                ));
            }
            let far = along(&a, &d1).max(along(&b, &d1)) + width;
            if d1.y == 0 {
                let x = far * d1.x;
                vec![a, Point::new(x, a.y), Point::new(x, b.y), b]
            } else {
                let y = far * d1.y;
                vec![a, Point::new(a.x, y), Point::new(b.x, y), b]
            }
        }
    };
    let mut deduped: Vec<Point> = Vec::with_capacity(pts.len());
    for p in pts {
        if deduped.last() != Some(&p) {
            deduped.push(p);
        }
    }
    Ok(deduped)
}

/// # Manhattan Route
///
/// Wire of `port1`'s width from `port1` to `port2`, leaving each along its orientation.
/// Perpendicular ports are joined by one bend, facing ports by a Z, and co-directed ports by a U.
/// The wire ends flush with both ports. Result ports `1` and `2` sit on `port1` and `port2`,
/// facing back into whatever those ports belong to.
pub fn route_manhattan(
    port1: &Port,
    port2: &Port,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    if port1.width != port2.width {
        return LayoutError::invalid(format!(
            "Cannot route between ports of width {} and {}",
            port1.width, port2.width
        ));
    }
    if !port1.is_manhattan() || !port2.is_manhattan() {
        return LayoutError::invalid("Manhattan routes require Manhattan port orientations");
    }
    let width = port1.width;
    let pts = centerline(port1, port2, width)?;
    let (lo, hi) = (width / 2, width - width / 2);
    let last = pts.len().saturating_sub(2);
    let mut segments = Vec::with_capacity(pts.len());
    for (k, pair) in pts.windows(2).enumerate() {
        let (p, q) = (pair[0], pair[1]);
        let d = q.minus(&p);
        let dir = Point::new(d.x.signum(), d.y.signum());
        let normal = Point::new(-dir.y, dir.x);
        // Interior joints extend to cover the corner; terminals stay flush
        let start = if k == 0 { p } else { p.minus(&scaled(&dir, lo)) };
        let end = if k == last { q } else { q.shift(&scaled(&dir, hi)) };
        segments.push(Polygon::new(vec![
            start.minus(&scaled(&normal, lo)),
            end.minus(&scaled(&normal, lo)),
            end.shift(&scaled(&normal, hi)),
            start.shift(&scaled(&normal, hi)),
        ]));
    }
    debug!("Routing {} segments", segments.len());

    let mut d = Device::new("route");
    d.add_polygons(union(&segments), layer);
    d.add_port(Port::new(
        "1",
        port1.midpoint,
        width,
        port1.orientation + 180.,
    ));
    d.add_port(Port::new(
        "2",
        port2.midpoint,
        width,
        port2.orientation + 180.,
    ));
    Ok(d)
}
