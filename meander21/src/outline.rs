//!
//! # Outlines
//!
//! Positive-tone fabrication draws the trench around a wire rather than the wire itself.
//! [outline] converts drawn devices into those trenches, and [outline_invert] goes the other way.
//!

// Crates.io
use serde::{Deserialize, Serialize};
use tracing::debug;

// Local imports
use crate::raw::{
    boolean, offset, um, BoolOp, BoundBoxTrait, Device, Int, LayerSpec, LayoutError,
    LayoutResult, Placement, Point, Polygon, Port,
};

/// # Outline Options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutlineOpts {
    /// Trench width, in micrometers
    pub distance: f64,
    /// Open the trench at every port. The opening is widened beyond the port
    /// by this multiple of `distance`, so neighboring outlines merge cleanly.
    pub open_ports: Option<f64>,
    /// Turn every copied port around
    pub rotate_ports: bool,
    /// Output layer
    pub layer: LayerSpec,
}
impl Default for OutlineOpts {
    fn default() -> Self {
        Self {
            distance: 1.,
            open_ports: None,
            rotate_ports: false,
            layer: LayerSpec::default(),
        }
    }
}
impl OutlineOpts {
    /// Options for a trench of `distance` on `layer`, with all else default
    pub fn new(distance: f64, layer: impl Into<LayerSpec>) -> Self {
        Self {
            distance,
            layer: layer.into(),
            ..Default::default()
        }
    }
    /// Set the port-opening width multiple
    pub fn open_ports(mut self, extra: f64) -> Self {
        self.open_ports = Some(extra);
        self
    }
}

/// Rectangle of `length` extending outward from `port`, `width` wide and centered on it
fn port_trim(port: &Port, length: Int, width: Int) -> Polygon {
    let (nx, ny) = port.normal();
    let (mx, my) = port.midpoint.to_f64();
    let (hw, l) = (width as f64 / 2., length as f64);
    // Left-hand tangent, looking outward
    let (tx, ty) = (-ny, nx);
    Polygon::new(vec![
        Point::round(mx + tx * hw, my + ty * hw),
        Point::round(mx - tx * hw, my - ty * hw),
        Point::round(mx - tx * hw + nx * l, my - ty * hw + ny * l),
        Point::round(mx + tx * hw + nx * l, my + ty * hw + ny * l),
    ])
}

/// # Outline
///
/// The trench of width `opts.distance` surrounding all of `device`'s geometry,
/// merged across layers. Ports are copied onto the result.
pub fn outline(device: &Device, opts: &OutlineOpts) -> LayoutResult<Device> {
    if !(opts.distance > 0.) {
        return LayoutError::invalid(format!(
            "Outline distance must be positive, got {}",
            opts.distance
        ));
    }
    let d = um(opts.distance);
    let polys = device.all_polygons()?;
    let grown = offset(&polys, d);
    let mut cut = polys;
    if let Some(extra) = opts.open_ports {
        for port in device.ports.iter() {
            cut.push(port_trim(port, d + 1, port.width + um(extra * opts.distance)));
        }
    }
    let ring = boolean(&grown, &cut, BoolOp::Not);
    debug!(
        "Outlined `{}` into {} polygons",
        device.name,
        ring.len()
    );

    let mut result = Device::new(format!("{}_outline", device.name));
    result.add_polygons(ring, opts.layer);
    for port in device.ports.iter() {
        let port = match opts.rotate_ports {
            true => port.rotated(180.),
            false => port.clone(),
        };
        result.add_port(port);
    }
    Ok(result)
}

/// # Outline Inversion
///
/// Subtracts `device` from its own bounding box, keeping the pieces at indices `selection`
/// (default: `[1]`). Pieces are ordered by decreasing area, ties broken by position.
/// The result is moved so its bounding box sits at the origin.
pub fn outline_invert(
    device: &Device,
    selection: Option<&[usize]>,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    let mut dev = device.clone();
    dev.move_bbox_to_origin()?;
    let bbox = dev.bbox();
    let frame = Polygon::new(rect_points(&bbox.p0, &bbox.p1));
    let mut pieces = boolean(&[frame], &dev.all_polygons()?, BoolOp::Not);
    pieces.sort_by(|a, b| {
        b.area()
            .total_cmp(&a.area())
            .then_with(|| a.points.iter().min().cmp(&b.points.iter().min()))
    });

    let selection = selection.unwrap_or(&[1usize][..]);
    let mut result = Device::new(format!("{}_inverse", device.name));
    let layer = layer.into();
    for &idx in selection.iter() {
        match pieces.get(idx) {
            Some(poly) => {
                result.add_polygon(poly.points.clone(), layer);
            }
            None => {
                return LayoutError::invalid(format!(
                    "Inverted outline has {} pieces, cannot select index {}",
                    pieces.len(),
                    idx
                ))
            }
        }
    }
    result.move_bbox_to_origin()?;
    Ok(result)
}

/// Corners of the axis-aligned rectangle from `p0` to `p1`, counter-clockwise
fn rect_points(p0: &Point, p1: &Point) -> Vec<Point> {
    vec![
        *p0,
        Point::new(p1.x, p0.y),
        *p1,
        Point::new(p0.x, p1.y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::straight;
    use crate::raw::BoundBox;

    fn total_area(polys: &[Polygon]) -> f64 {
        polys.iter().map(|p| p.area().abs()).sum()
    }

    #[test]
    fn closed_outline() -> LayoutResult<()> {
        let wire = straight((1., 10.), 1);
        let ring = outline(&wire, &OutlineOpts::new(0.5, 2))?;
        assert_eq!(ring.layers(), vec![LayerSpec::new(2, 0)]);
        assert_eq!(
            ring.bbox(),
            BoundBox::from_points(Point::um(-0.5, -0.5), Point::um(1.5, 10.5))
        );
        // (2 x 11) minus (1 x 10), in square nanometers
        let area = total_area(&ring.all_polygons()?);
        assert!((area - 12e6).abs() < 1.);
        // Ports are copied, unrotated
        assert_eq!(ring.port("1")?, wire.port("1")?);
        Ok(())
    }
    #[test]
    fn open_ports() -> LayoutResult<()> {
        let wire = straight((1., 10.), 1);
        let opts = OutlineOpts {
            rotate_ports: true,
            ..OutlineOpts::new(0.5, 2).open_ports(2.)
        };
        let ring = outline(&wire, &opts)?;
        // Both end caps are removed; only the side trenches remain
        assert_eq!(
            ring.bbox(),
            BoundBox::from_points(Point::um(-0.5, 0.), Point::um(1.5, 10.))
        );
        let area = total_area(&ring.all_polygons()?);
        assert!((area - 10e6).abs() < 1.);
        assert_eq!(ring.port("1")?.orientation, 270.);
        assert_eq!(ring.port("2")?.orientation, 90.);
        Ok(())
    }
    #[test]
    fn outline_requires_distance() {
        let wire = straight((1., 10.), 1);
        assert!(outline(&wire, &OutlineOpts::new(0., 2)).is_err());
    }
    #[test]
    fn inversion() -> LayoutResult<()> {
        // A square frame with a bar across it, leaving gaps of 8x3 below and 8x4 above
        let mut d = Device::new("frame");
        d.add_rect(Point::um(0., 0.), Point::um(10., 1.), 1);
        d.add_rect(Point::um(0., 9.), Point::um(10., 10.), 1);
        d.add_rect(Point::um(0., 0.), Point::um(1., 10.), 1);
        d.add_rect(Point::um(9., 0.), Point::um(10., 10.), 1);
        d.add_rect(Point::um(1., 4.), Point::um(9., 5.), 1);
        d.movex(um(100.));

        // Larger pieces come first, so the default selection is the lower gap
        let inv = outline_invert(&d, Some(&[0, 1]), 3)?;
        assert_eq!(inv.elems.len(), 2);
        assert_eq!(
            inv.bbox(),
            BoundBox::from_points(Point::new(0, 0), Point::um(8., 8.))
        );
        let lower = outline_invert(&d, None, 3)?;
        assert_eq!(
            lower.bbox(),
            BoundBox::from_points(Point::new(0, 0), Point::um(8., 3.))
        );
        assert!(outline_invert(&d, Some(&[2]), 3).is_err());
        assert!(outline_invert(&Device::new("empty"), None, 3).is_err());
        Ok(())
    }
}
