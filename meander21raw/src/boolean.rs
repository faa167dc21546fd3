//!
//! # Polygon Boolean Operations and Offsets
//!
//! Set operations over integer [Polygon]s, performed in floating point by [geo]
//! and rounded back onto the database grid.
//!
//! Results never contain holes. GDSII boundaries cannot represent them,
//! so any polygon with a hole is fractured into hole-free pieces.
//! Pieces are also split until none has more than [MAX_POINTS] vertices.
//!

// Crates.io
use geo::{BooleanOps, Coord, LineString, MultiPolygon};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// Local imports
use crate::{
    data::{Device, LayerSpec},
    error::LayoutResult,
    geom::{Int, Point, Polygon},
    utils::enumstr,
};

/// Polygon type of the [geo] crate, in floating-point database units
type GeoPolygon = geo::Polygon<f64>;
/// Multi-polygon type of the [geo] crate, in floating-point database units
type GeoMulti = MultiPolygon<f64>;

/// Most vertices of any output polygon, the common GDSII boundary limit
pub const MAX_POINTS: usize = 199;
/// Recursion limit for fracturing
const MAX_FRACTURE_DEPTH: usize = 32;
/// Miter joins extending further than this multiple of the offset distance are beveled
const MITER_LIMIT: f64 = 2.0;

enumstr!(
    /// # Boolean Operations
    ///
    /// Named as in parameter files: `"or"`, `"and"`, `"A-B"`, `"xor"`.
    BoolOp {
        Or: "or",
        And: "and",
        Not: "A-B",
        Xor: "xor",
    }
);

/// Apply boolean operation `op` to polygon-sets `a` and `b`.
/// Each set is first merged with itself, so overlaps within a set are harmless.
pub fn boolean(a: &[Polygon], b: &[Polygon], op: BoolOp) -> Vec<Polygon> {
    let (ma, mb) = (union_geo(a), union_geo(b));
    let result = match op {
        BoolOp::Or => ma.union(&mb),
        BoolOp::And => ma.intersection(&mb),
        BoolOp::Not => ma.difference(&mb),
        BoolOp::Xor => ma.xor(&mb),
    };
    from_geo(&result)
}

/// Merge all overlapping and touching polygons in `polys`
pub fn union(polys: &[Polygon]) -> Vec<Polygon> {
    from_geo(&union_geo(polys))
}

/// Grow each polygon in `polys` outward by `distance`, or shrink it for negative `distance`.
///
/// Edges move parallel to themselves. Corners are mitered, unless the miter would reach
/// more than twice `distance` from the original vertex, in which case they are beveled.
/// A zero `distance` returns the union of `polys`.
pub fn offset(polys: &[Polygon], distance: Int) -> Vec<Polygon> {
    let merged = union_geo(polys);
    if distance == 0 {
        return from_geo(&merged);
    }
    let side = if distance > 0 { 1.0 } else { -1.0 };
    let d = distance.abs() as f64;
    let mut band = Vec::new();
    for poly in merged.0.iter() {
        ring_band(poly.exterior(), true, side, d, &mut band);
        for hole in poly.interiors() {
            ring_band(hole, false, side, d, &mut band);
        }
    }
    debug!("Offsetting by {} with {} band pieces", distance, band.len());
    let band = union_all(band);
    let result = if distance > 0 {
        merged.union(&band)
    } else {
        merged.difference(&band)
    };
    from_geo(&result)
}

/// Apply boolean operation `op` to the flattened polygons of devices `a` and `b`, on all layers.
/// Returns a new, flat device with the result on `layer`.
pub fn boolean_devices(
    a: &Device,
    b: &Device,
    op: BoolOp,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    let polys = boolean(&a.all_polygons()?, &b.all_polygons()?, op);
    let mut device = Device::new(format!("{}_{}_{}", a.name, op, b.name));
    device.add_polygons(polys, layer);
    Ok(device)
}

/// Union of all `polys`, as a [geo] multi-polygon
fn union_geo(polys: &[Polygon]) -> GeoMulti {
    let parts = polys
        .iter()
        .filter(|p| p.points.len() >= 3 && p.area() != 0.0)
        .map(|p| MultiPolygon::new(vec![to_geo(&p.points)]))
        .collect();
    union_all(parts)
}

/// Union a list of multi-polygons by balanced pairwise reduction
fn union_all(mut parts: Vec<GeoMulti>) -> GeoMulti {
    while parts.len() > 1 {
        let mut next = Vec::with_capacity((parts.len() + 1) / 2);
        let mut iter = parts.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        parts = next;
    }
    parts.pop().unwrap_or_else(|| MultiPolygon::new(Vec::new()))
}

/// Convert a list of integer [Point]s into a hole-free [geo] polygon
fn to_geo(points: &[Point]) -> GeoPolygon {
    let coords: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord {
            x: p.x as f64,
            y: p.y as f64,
        })
        .collect();
    GeoPolygon::new(LineString::from(coords), Vec::new())
}

/// Convert floating-point vertices into a [geo] polygon
fn to_geo_f64(points: &[(f64, f64)]) -> GeoMulti {
    let coords: Vec<Coord<f64>> = points.iter().map(|&(x, y)| Coord { x, y }).collect();
    MultiPolygon::new(vec![GeoPolygon::new(LineString::from(coords), Vec::new())])
}

/// Convert a [geo] result back to integer polygons, fracturing any with holes
fn from_geo(multi: &GeoMulti) -> Vec<Polygon> {
    let mut out = Vec::new();
    for poly in multi.0.iter() {
        fracture_into(poly, 0, &mut out);
    }
    out
}

/// Cut `poly` until every piece is hole-free and has at most [MAX_POINTS] vertices.
/// Polygons with holes are cut vertically through the middle of their first hole.
/// Oversized polygons are cut across their longer side, at the median vertex coordinate.
/// Pieces are pushed onto `out`.
fn fracture_into(poly: &GeoPolygon, depth: usize, out: &mut Vec<Polygon>) {
    let has_holes = !poly.interiors().is_empty();
    let num_points = poly.exterior().0.len().saturating_sub(1);
    if !has_holes && num_points <= MAX_POINTS {
        out.extend(ring_to_poly(poly.exterior()));
        return;
    }
    if depth >= MAX_FRACTURE_DEPTH {
        warn!(
            "Fracture depth limit reached with {} vertices; dropping {} holes",
            num_points,
            poly.interiors().len()
        );
        out.extend(ring_to_poly(poly.exterior()));
        return;
    }
    let (x0, x1, y0, y1) = extents(poly.exterior());
    let (vertical, cut) = if has_holes {
        let (hx0, hx1, _, _) = extents(&poly.interiors()[0]);
        (true, (hx0 + hx1) / 2.0)
    } else if x1 - x0 >= y1 - y0 {
        (true, median(poly.exterior().0.iter().map(|c| c.x), x0, x1))
    } else {
        (false, median(poly.exterior().0.iter().map(|c| c.y), y0, y1))
    };
    let halves = if vertical {
        [
            [(x0 - 1.0, y0 - 1.0), (cut, y1 + 1.0)],
            [(cut, y0 - 1.0), (x1 + 1.0, y1 + 1.0)],
        ]
    } else {
        [
            [(x0 - 1.0, y0 - 1.0), (x1 + 1.0, cut)],
            [(x0 - 1.0, cut), (x1 + 1.0, y1 + 1.0)],
        ]
    };
    let whole = MultiPolygon::new(vec![poly.clone()]);
    for [(l, b), (r, t)] in halves {
        let half = to_geo_f64(&[(l, b), (r, b), (r, t), (l, t)]);
        for piece in whole.intersection(&half).0.iter() {
            fracture_into(piece, depth + 1, out);
        }
    }
}

/// Median of `vals`, if it lies strictly between `lo` and `hi`. Otherwise their midpoint.
fn median(vals: impl Iterator<Item = f64>, lo: f64, hi: f64) -> f64 {
    let mut vals: Vec<f64> = vals.collect();
    vals.sort_by(|a, b| a.total_cmp(b));
    match vals.get(vals.len() / 2) {
        Some(&m) if m > lo && m < hi => m,
        _ => (lo + hi) / 2.0,
    }
}

/// Extents of `ring` as (xmin, xmax, ymin, ymax)
fn extents(ring: &LineString<f64>) -> (f64, f64, f64, f64) {
    let mut e = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for c in ring.0.iter() {
        e.0 = e.0.min(c.x);
        e.1 = e.1.max(c.x);
        e.2 = e.2.min(c.y);
        e.3 = e.3.max(c.y);
    }
    e
}

/// Round a closed ring onto the integer grid.
/// Returns [None] for rings which collapse to fewer than three points or zero area.
/// Results are wound counter-clockwise.
fn ring_to_poly(ring: &LineString<f64>) -> Option<Polygon> {
    let mut pts: Vec<Point> = Vec::with_capacity(ring.0.len());
    for c in ring.0.iter() {
        let p = Point::round(c.x, c.y);
        if pts.last() != Some(&p) {
            pts.push(p);
        }
    }
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return None;
    }
    let mut poly = Polygon::new(pts);
    let area = poly.area();
    if area == 0.0 {
        return None;
    }
    if area < 0.0 {
        poly.reverse();
    }
    Some(poly)
}

/// Push the offset band along one ring of a merged polygon onto `out`.
///
/// Rings are re-wound so that material always lies to the left of each edge:
/// exteriors counter-clockwise, holes clockwise. The band lies to the right for `side > 0`
/// (growth) and to the left for `side < 0` (shrinkage).
fn ring_band(ring: &LineString<f64>, exterior: bool, side: f64, d: f64, out: &mut Vec<GeoMulti>) {
    let mut pts: Vec<(f64, f64)> = Vec::with_capacity(ring.0.len());
    for c in ring.0.iter() {
        if pts.last() != Some(&(c.x, c.y)) {
            pts.push((c.x, c.y));
        }
    }
    if pts.len() > 1 && pts.first() == pts.last() {
        pts.pop();
    }
    let n = pts.len();
    if n < 3 {
        return;
    }
    let mut twice_area = 0.0;
    for k in 0..n {
        let (p, q) = (pts[k], pts[(k + 1) % n]);
        twice_area += p.0 * q.1 - q.0 * p.1;
    }
    if (twice_area > 0.0) != exterior {
        pts.reverse();
    }
    // Unit normal of each edge, on the band side
    let normals: Vec<(f64, f64)> = (0..n)
        .map(|k| {
            let (p, q) = (pts[k], pts[(k + 1) % n]);
            let (dx, dy) = (q.0 - p.0, q.1 - p.1);
            let len = (dx * dx + dy * dy).sqrt();
            (side * dy / len, -side * dx / len)
        })
        .collect();
    for k in 0..n {
        // Rectangle swept by edge `k`
        let (p, q) = (pts[k], pts[(k + 1) % n]);
        let nk = normals[k];
        out.push(to_geo_f64(&[
            p,
            q,
            (q.0 + d * nk.0, q.1 + d * nk.1),
            (p.0 + d * nk.0, p.1 + d * nk.1),
        ]));
        // Join at vertex `k`, between the incoming and outgoing edges
        let v = pts[k];
        let prev = pts[(k + n - 1) % n];
        let (e1, e2) = ((v.0 - prev.0, v.1 - prev.1), (q.0 - v.0, q.1 - v.1));
        let cross = e1.0 * e2.1 - e1.1 * e2.0;
        if side * cross <= 0.0 {
            // The edge rectangles already overlap on the band side
            continue;
        }
        let (n1, n2) = (normals[(k + n - 1) % n], nk);
        let a = (v.0 + d * n1.0, v.1 + d * n1.1);
        let b = (v.0 + d * n2.0, v.1 + d * n2.1);
        let denom = 1.0 + n1.0 * n2.0 + n1.1 * n2.1;
        let miter = if denom > 1e-9 {
            let m = ((n1.0 + n2.0) / denom, (n1.1 + n2.1) / denom);
            if (m.0 * m.0 + m.1 * m.1).sqrt() <= MITER_LIMIT {
                Some((v.0 + d * m.0, v.1 + d * m.1))
            } else {
                None
            }
        } else {
            None
        };
        match miter {
            Some(m) => out.push(to_geo_f64(&[v, a, m, b])),
            None => out.push(to_geo_f64(&[v, a, b])),
        }
    }
}
