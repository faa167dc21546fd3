//!
//! # Meander Detectors
//!
//! Square SNSPD meanders, optionally split into several series-connected paths,
//! outlined for positive-tone exposure, and tapered out to wide terminals.
//!

// Std-Lib
use std::sync::Arc;

// Crates.io
use serde::{Deserialize, Serialize};
use tracing::debug;

// Local imports
use crate::outline::{outline, OutlineOpts};
use crate::primitives::{hyper_taper, rectangle, snspd, straight, Snspd};
use crate::raw::{
    boolean, to_um, um, BoolOp, BoundBoxTrait, Device, LayerSpec, LayoutError, LayoutResult,
    Placement, Point, Port,
};

/// Length of the links joining consecutive paths, in micrometers
const LINK_LENGTH: f64 = 0.5;

/// # Meander Parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Meander {
    /// Wire width
    pub width: f64,
    /// Gap between adjacent wires
    pub pitch: f64,
    /// Side length of the square meander area
    pub area: f64,
    /// Overall length, including links. Defaults to `area`.
    pub length: Option<f64>,
    /// Number of meander paths placed end to end
    pub number_of_paths: usize,
    pub terminals_same_side: bool,
}
impl Default for Meander {
    fn default() -> Self {
        Self {
            width: 0.1,
            pitch: 0.25,
            area: 8.,
            length: None,
            number_of_paths: 1,
            terminals_same_side: false,
        }
    }
}
impl Meander {
    /// Create a meander of `width`, `pitch`, and `area`, with all else default
    pub fn new(width: f64, pitch: f64, area: f64) -> Self {
        Self {
            width,
            pitch,
            area,
            ..Default::default()
        }
    }
}

/// # Taper Parameters
/// Hyperbolic tapers added to both ends of a meander
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MeanderTaper {
    pub length: f64,
    pub narrow: f64,
    pub wide: f64,
}
impl Default for MeanderTaper {
    fn default() -> Self {
        Self {
            length: 50.,
            narrow: 0.1,
            wide: 200.,
        }
    }
}
impl MeanderTaper {
    /// The shorter tapers used on outlined meanders
    pub fn outlined() -> Self {
        Self {
            length: 10.,
            narrow: 0.1,
            wide: 100.,
        }
    }
}

/// # Meander
///
/// One or more [snspd] paths, each `area` tall, joined by short links.
/// Every other path is mirrored, so the links alternate between top and bottom.
/// Port `1` faces 180 degrees from the origin; port `2` faces 0 degrees.
pub fn meander(params: &Meander, layer: impl Into<LayerSpec>) -> LayoutResult<Device> {
    let layer = layer.into();
    let n = params.number_of_paths;
    if n == 0 {
        return LayoutError::invalid("Meander requires at least one path");
    }
    let path_length = match params.length {
        Some(length) => (length - LINK_LENGTH * (n - 1) as f64) / n as f64,
        None => params.area / n as f64,
    };
    debug!("Meander of {} paths, each {} long", n, path_length);
    let path = Arc::new(snspd(
        &Snspd {
            wire_width: params.width,
            wire_pitch: params.pitch + params.width,
            size: (Some(path_length), Some(params.area)),
            num_squares: None,
            turn_ratio: 4.,
            terminals_same_side: params.terminals_same_side,
        },
        layer,
    )?);
    let link = Arc::new(straight((params.width, LINK_LENGTH), layer));

    let mut d = Device::new("meander");
    let mut start = Point::default();
    let mut end = Point::default();
    let mut link_end: Option<Port> = None;
    for k in 0..n {
        let s = d.add_ref(Arc::clone(&path));
        if k % 2 == 1 {
            s.mirror(&Point::um(0., 1.), &Point::um(1., 1.));
        }
        if let Some(link_end) = link_end.take() {
            s.move_port("1", link_end.midpoint)?;
        }
        if k == 0 {
            start = s.port("1")?.midpoint;
        }
        let s2 = s.port("2")?;
        if k == n - 1 {
            end = s2.midpoint;
        } else {
            let l = d.add_ref(Arc::clone(&link));
            l.rotate(90.);
            l.move_port("1", s2.midpoint)?;
            link_end = Some(l.port("2")?);
        }
    }
    d.flatten_to_layer(layer);
    let w = um(params.width);
    d.add_port(Port::new("1", start, w, 180.));
    d.add_port(Port::new("2", end, w, 0.));
    d.move_to(start, Point::default());
    Ok(d)
}

/// # Outlined Meander
///
/// The [outline] of a [meander], opened across the wire at both terminals
/// so that leads can continue the trench. Port `1` sits at the origin.
pub fn meander_outline(
    params: &Meander,
    outline_width: f64,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    let layer = layer.into();
    let m = meander(params, layer)?;
    let (p1, p2) = (m.port("1")?, m.port("2")?);
    let trench = outline(&m, &OutlineOpts::new(outline_width, layer))?;

    // Trims across each terminal, one trench deep
    let mut t1 = straight((params.width, outline_width), layer);
    t1.rotate(90.);
    t1.move_port("1", p2.midpoint)?;
    let mut t2 = straight((params.width, outline_width), layer);
    t2.rotate(90.);
    t2.move_port("2", p1.midpoint)?;
    let (t1_2, t2_1) = (t1.port("2")?, t2.port("1")?);
    let mut trims = t1.all_polygons()?;
    trims.extend(t2.all_polygons()?);

    let mut d = Device::new("meander_outline");
    d.add_polygons(
        boolean(&trench.all_polygons()?, &trims, BoolOp::Not),
        layer,
    );
    d.add_port(t2_1.renamed("1"));
    d.add_port(t1_2.renamed("2"));
    d.move_port("1", Point::default())?;
    Ok(d)
}

/// # Tapered Meander
///
/// A [meander] with [hyper_taper]s widening out from both terminals.
/// Ports `1` and `2` sit on the wide ends, `taper.wide` across.
pub fn meander_taper(
    params: &Meander,
    taper: &MeanderTaper,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    let layer = layer.into();
    let m = meander(params, layer)?;
    let (p1, p2) = (m.port("1")?, m.port("2")?);
    let ht = Arc::new(hyper_taper(taper.length, taper.wide, taper.narrow, layer)?);

    let mut d = Device::new("meander_taper");
    d.add_ref(m);
    let left = d.add_ref(Arc::clone(&ht));
    left.rotate(180.);
    left.move_port("narrow", p1.midpoint)?;
    let left_wide = left.port("wide")?;
    let right = d.add_ref(ht);
    right.move_port("narrow", p2.midpoint)?;
    let right_wide = right.port("wide")?;

    d.add_port(left_wide.renamed("1"));
    d.add_port(right_wide.renamed("2"));
    d.move_port("1", Point::default())?;
    Ok(d)
}

/// # Outlined Tapered Meander
///
/// The [outline] of a [meander_taper], with the trench cut away across both wide ends.
/// Ports match those of the tapered meander.
pub fn meander_taper_outline(
    params: &Meander,
    taper: &MeanderTaper,
    outline_width: f64,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    let layer = layer.into();
    let m = meander_taper(params, taper, layer)?;
    let trench = outline(&m, &OutlineOpts::new(outline_width, layer))?;
    let bbox = trench.bbox().non_empty("meander_taper_outline")?;

    // Trims over each end of the trench, spanning its full height
    let ymax = bbox.p1.y.max(-bbox.p0.y);
    let trim = rectangle((outline_width, 2. * to_um(ymax)), layer);
    let mut east = trim.clone();
    east.move_to(
        Point::default(),
        Point::new(bbox.p1.x - um(outline_width), -ymax),
    );
    let mut west = trim;
    west.move_to(Point::default(), Point::new(bbox.p0.x, -ymax));
    let mut trims = east.all_polygons()?;
    trims.extend(west.all_polygons()?);

    let mut d = Device::new("meander_taper_outline");
    d.add_polygons(
        boolean(&trench.all_polygons()?, &trims, BoolOp::Not),
        layer,
    );
    d.add_port(m.port("1")?);
    d.add_port(m.port("2")?);
    Ok(d)
}
