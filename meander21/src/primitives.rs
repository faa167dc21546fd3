//!
//! # Primitive Device Generators
//!
//! Rectangles, tapers, steps, bends, hairpins, and pads,
//! from which every device family is assembled.
//!
//! Sizes are in micrometers. Each generator returns a flat [Device]
//! with named [Port]s, except [snspd], which places instances of its hairpins.
//!

// Std-Lib
use std::f64::consts::PI;
use std::sync::Arc;

// Crates.io
use num::complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

// Local imports
use crate::outline::{outline, OutlineOpts};
use crate::raw::{um, Device, LayerSpec, LayoutError, LayoutResult, Placement, Point, Port};
use crate::utils::enumstr;

/// Sampling interval of [hyper_taper] profiles, in micrometers
pub const HYPER_TAPER_STEP: f64 = 0.1;
/// Iteration limit for tracing the [optimal_hairpin] curve
const MAX_HAIRPIN_STEPS: usize = 1_000_000;
/// Iteration limit of the golden-section search in [optimal_step]
const MAX_SEARCH_STEPS: usize = 200;
/// Segments per quarter-circle of [tee] fillets
const FILLET_SEGMENTS: usize = 16;

/// Convert micrometer coordinate pairs to [Point]s
fn points(xy: &[(f64, f64)]) -> Vec<Point> {
    xy.iter().map(|&(x, y)| Point::um(x, y)).collect()
}

/// Fail unless `val` is positive and finite
fn positive(what: &str, val: f64) -> LayoutResult<()> {
    if !(val > 0. && val.is_finite()) {
        return LayoutError::invalid(format!("{} must be positive, got {}", what, val));
    }
    Ok(())
}

/// Rectangle of `size` (width, height), with its lower-left corner at the origin
pub fn rectangle(size: (f64, f64), layer: impl Into<LayerSpec>) -> Device {
    let mut d = Device::new("rectangle");
    d.add_rect(Point::new(0, 0), Point::um(size.0, size.1), layer);
    d
}

/// Rectangle of `size` centered on the origin,
/// with ports `N`, `S`, `E`, and `W` at the centers of its edges.
pub fn compass(size: (f64, f64), layer: impl Into<LayerSpec>) -> Device {
    let (w, h) = size;
    let mut d = Device::new("compass");
    d.add_rect(Point::um(-w / 2., -h / 2.), Point::um(w / 2., h / 2.), layer);
    d.add_port(Port::new("N", Point::um(0., h / 2.), um(w), 90.));
    d.add_port(Port::new("S", Point::um(0., -h / 2.), um(w), 270.));
    d.add_port(Port::new("E", Point::um(w / 2., 0.), um(h), 0.));
    d.add_port(Port::new("W", Point::um(-w / 2., 0.), um(h), 180.));
    d
}

/// Vertical wire of `size` (width, length) with its lower-left corner at the origin.
/// Port `1` faces up from the top edge, port `2` down from the bottom.
pub fn straight(size: (f64, f64), layer: impl Into<LayerSpec>) -> Device {
    let (w, l) = size;
    let mut d = Device::new("straight");
    d.add_rect(Point::new(0, 0), Point::um(w, l), layer);
    d.add_port(Port::new("1", Point::um(w / 2., l), um(w), 90.));
    d.add_port(Port::new("2", Point::um(w / 2., 0.), um(w), 270.));
    d
}

/// # Hyperbolic Taper
///
/// Widens from `narrow` at x=0 to `wide` at x=`length`, with half-width `narrow/2 * cosh(a*x)`.
/// The profile is sampled every [HYPER_TAPER_STEP], plus the final point at `length`.
/// Ports are named `narrow` (facing 180 degrees) and `wide` (facing 0 degrees).
pub fn hyper_taper(
    length: f64,
    wide: f64,
    narrow: f64,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    positive("Taper length", length)?;
    positive("Taper narrow width", narrow)?;
    if wide < narrow {
        return LayoutError::invalid(format!(
            "Taper wide width {} is narrower than its narrow width {}",
            wide, narrow
        ));
    }
    let a = (wide / narrow).acosh() / length;
    let mut xs: Vec<f64> = (0usize..)
        .map(|k| k as f64 * HYPER_TAPER_STEP)
        .take_while(|&x| x < length - 1e-9)
        .collect();
    xs.push(length);

    let half = |x: f64| (a * x).cosh() * narrow / 2.;
    let mut pts: Vec<Point> = xs.iter().map(|&x| Point::um(x, half(x))).collect();
    pts.extend(xs.iter().rev().map(|&x| Point::um(x, -half(x))));

    let mut d = Device::new("hyper_taper");
    d.add_polygon(pts, layer);
    d.add_port(Port::new("narrow", Point::new(0, 0), um(narrow), 180.));
    d.add_port(Port::new("wide", Point::um(length, 0.), um(wide), 0.));
    Ok(d)
}

/// # Optimal Step Parameters
///
/// Step between two wire widths, shaped by the Clem-Berggren conformal map
/// to avoid current crowding at its corners.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimalStep {
    /// Width at port `1`
    pub start_width: f64,
    /// Width at port `2`
    pub end_width: f64,
    /// Number of points along the curved edge
    pub num_pts: usize,
    /// The curve is cut off where it comes within this fraction of either width
    pub width_tol: f64,
    /// Stretch factor applied along the length of the step
    pub anticrowding_factor: f64,
    /// Whether both edges are curved, centering the step on the x-axis
    pub symmetric: bool,
}
impl Default for OptimalStep {
    fn default() -> Self {
        Self {
            start_width: 10.,
            end_width: 22.,
            num_pts: 50,
            width_tol: 1e-3,
            anticrowding_factor: 1.2,
            symmetric: false,
        }
    }
}
impl OptimalStep {
    /// Create a step from `start_width` to `end_width`, with all else default
    pub fn new(start_width: f64, end_width: f64) -> Self {
        Self {
            start_width,
            end_width,
            ..Default::default()
        }
    }
}

/// Point on the conformal step boundary at parameter `eta` in `(0, pi)`,
/// for a step from width `w0` to the wider `a`.
fn step_point(eta: f64, w0: f64, a: f64) -> (f64, f64) {
    let gamma = (a * a + w0 * w0) / (a * a - w0 * w0);
    let w = Complex64::from_polar(1., eta);
    let t1 = ((w - gamma) / (gamma + 1.)).sqrt().atan() * w0;
    let t2 = (Complex64::new(gamma - 1., 0.) / (w - gamma)).sqrt().atan() * a;
    let zeta = Complex64::new(0., 4. / PI) * (t1 + t2);
    (zeta.re, zeta.im)
}

/// Coordinate of a [step_point] to match against a target
#[derive(Debug, Clone, Copy)]
enum StepTarget {
    X(f64),
    Y(f64),
}

/// Find the [step_point] closest to `target`, by golden-section search over `eta`
fn invert_step_point(target: StepTarget, w0: f64, a: f64) -> (f64, f64) {
    let cost = |eta: f64| {
        let (x, y) = step_point(eta, w0, a);
        match target {
            StepTarget::X(xt) => (x - xt).powi(2),
            StepTarget::Y(yt) => (y - yt).powi(2),
        }
    };
    let g = (5f64.sqrt() - 1.) / 2.;
    let (mut lo, mut hi) = (0., PI);
    let mut c = hi - g * (hi - lo);
    let mut d = lo + g * (hi - lo);
    let (mut fc, mut fd) = (cost(c), cost(d));
    for _ in 0..MAX_SEARCH_STEPS {
        if hi - lo < 1e-12 {
            break;
        }
        if fc < fd {
            hi = d;
            d = c;
            fd = fc;
            c = hi - g * (hi - lo);
            fc = cost(c);
        } else {
            lo = c;
            c = d;
            fc = fd;
            d = lo + g * (hi - lo);
            fd = cost(d);
        }
    }
    step_point((lo + hi) / 2., w0, a)
}

/// # Optimal Step
///
/// Ports `1` (start width, facing 180 degrees) and `2` (end width, facing 0 degrees).
/// Equal widths produce a square.
pub fn optimal_step(step: &OptimalStep, layer: impl Into<LayerSpec>) -> LayoutResult<Device> {
    positive("Step start width", step.start_width)?;
    positive("Step end width", step.end_width)?;
    if step.num_pts < 2 {
        return LayoutError::invalid("Optimal step requires at least two points");
    }
    let (start, end) = (step.start_width, step.end_width);
    let (mut xs, mut ys): (Vec<f64>, Vec<f64>);
    if start == end {
        xs = vec![0., 0., start, start];
        ys = if step.symmetric {
            vec![-start / 2., start / 2., start / 2., -start / 2.]
        } else {
            vec![0., start, start, 0.]
        };
    } else {
        let reverse = start > end;
        let (w0, a) = if reverse { (end, start) } else { (start, end) };
        let (xmin, _) = invert_step_point(StepTarget::Y(w0 * (1. + step.width_tol)), w0, a);
        let (xmax, _) = invert_step_point(StepTarget::Y(a * (1. - step.width_tol)), w0, a);
        let n = step.num_pts;
        xs = (0..n)
            .map(|k| xmin + (xmax - xmin) * k as f64 / (n - 1) as f64)
            .collect();
        ys = xs
            .iter()
            .map(|&x| invert_step_point(StepTarget::X(x), w0, a).1)
            .collect();
        ys[0] = w0;
        ys[n - 1] = a;
        if step.symmetric {
            let (xr, yr): (Vec<f64>, Vec<f64>) =
                xs.iter().rev().zip(ys.iter().rev()).map(|(x, y)| (*x, -*y)).unzip();
            xs.extend(xr);
            ys.extend(yr);
            xs.iter_mut().for_each(|x| *x /= 2.);
            ys.iter_mut().for_each(|y| *y /= 2.);
        } else {
            xs.push(xs[n - 1]);
            ys.push(0.);
            xs.push(xs[0]);
            ys.push(0.);
        }
        xs.iter_mut().for_each(|x| *x *= step.anticrowding_factor);
        if reverse {
            xs.iter_mut().for_each(|x| *x = -*x);
        }
    }
    let xlo = xs.iter().cloned().fold(f64::INFINITY, f64::min);
    let xhi = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let (y1, y2) = if step.symmetric {
        (0., 0.)
    } else {
        (start / 2., end / 2.)
    };
    let xy: Vec<(f64, f64)> = xs.into_iter().zip(ys.into_iter()).collect();

    let mut d = Device::new("optimal_step");
    d.add_polygon(points(&xy), layer);
    d.add_port(Port::new("1", Point::um(xlo, y1), um(start), 180.));
    d.add_port(Port::new("2", Point::um(xhi, y2), um(end), 0.));
    Ok(d)
}

/// # Optimal Right-Angle Bend
///
/// Bend of wire `width` with a conformal inner corner, sampled at `num_pts` points.
/// `length_adjust` sets the logarithmic extent of the sampled curve.
/// Port `1` faces up (90 degrees), port `2` right (0 degrees).
pub fn optimal_90deg(
    width: f64,
    num_pts: usize,
    length_adjust: f64,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    positive("Bend width", width)?;
    if num_pts < 2 {
        return LayoutError::invalid("Optimal bend requires at least two points");
    }
    let a = 2. * width;
    let mut xy: Vec<(f64, f64)> = (0..num_pts)
        .map(|k| {
            let e = -length_adjust + 2. * length_adjust * k as f64 / (num_pts - 1) as f64;
            let v = 10f64.powf(e);
            (
                a / 2. * (1. + 2. / PI * (1. / v).asinh()),
                a / 2. * (1. + 2. / PI * v.asinh()),
            )
        })
        .collect();
    let d = 2. * xy[0].0;
    xy.extend_from_slice(&[(width, d), (0., d), (0., 0.), (d, 0.), (d, width)]);

    let mut dev = Device::new("optimal_90deg");
    dev.add_polygon(points(&xy), layer);
    dev.add_port(Port::new("1", Point::um(a / 4., d), um(a / 2.), 90.));
    dev.add_port(Port::new("2", Point::um(d, a / 4.), um(a / 2.), 0.));
    Ok(dev)
}

/// # Optimal Hairpin
///
/// U-turn of wire `width` between two parallel wires at center-to-center distance `pitch`.
/// The inner edge of the turn follows a conformal-map curve, traced by fixed-length steps
/// and downsampled to about `num_pts` points. The straight arms extend `length` behind the turn,
/// which itself is `turn_ratio` widths deep.
/// Ports `1` (upper arm) and `2` (lower arm) both face 180 degrees.
pub fn optimal_hairpin(
    width: f64,
    pitch: f64,
    length: f64,
    turn_ratio: f64,
    num_pts: usize,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    let layer = layer.into();
    positive("Hairpin width", width)?;
    if pitch <= width {
        return LayoutError::invalid(format!(
            "Hairpin pitch {} must exceed its width {}",
            pitch, width
        ));
    }
    if num_pts == 0 {
        return LayoutError::invalid("Hairpin requires at least one point");
    }
    let a = (pitch + width) / 2.;
    let (mut x, mut y) = (-pitch, -(pitch - width) / 2.);
    let dl = width / (num_pts as f64 * 2.);
    let mut curve = vec![(x, y)];
    while y < 0. && curve.len() <= MAX_HAIRPIN_STEPS {
        let s = Complex64::new(x, y);
        let w = (Complex64::new(1., 0.) - (s * PI / a).exp()).sqrt();
        let norm = w.norm();
        x += w.re / norm * dl;
        y += w.im / norm * dl;
        curve.push((x, y));
    }
    if let Some(last) = curve.last_mut() {
        last.1 = 0.;
    }
    // Downsample, always keeping the final point
    let ds = (curve.len() / num_pts).max(1);
    let mut xy: Vec<(f64, f64)> = curve.iter().rev().step_by(ds).cloned().collect();
    xy.reverse();
    debug!("Hairpin curve traced in {} steps, kept {}", curve.len(), xy.len());

    let (x0, y0) = xy[0];
    let xturn = xy[xy.len() - 1].0 + turn_ratio * width;
    let xback = xturn - length;
    if xback > x0 {
        return LayoutError::invalid(format!(
            "Hairpin length {} is shorter than its turn, {}",
            length,
            xturn - x0
        ));
    }
    xy.extend_from_slice(&[
        (xturn, 0.),
        (xturn, -a),
        (x0, -a),
        (xback, -a),
        (xback, -a + width),
        (x0, y0),
    ]);
    let xmin = xy.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let mirrored: Vec<(f64, f64)> = xy.iter().map(|&(x, y)| (x, -y)).collect();

    let mut d = Device::new("optimal_hairpin");
    d.add_polygon(points(&xy), layer);
    d.add_polygon(points(&mirrored), layer);
    d.add_port(Port::new("1", Point::um(xmin, a - width / 2.), um(width), 180.));
    d.add_port(Port::new("2", Point::um(xmin, -a + width / 2.), um(width), 180.));
    Ok(d)
}

/// # SNSPD Meander Parameters
///
/// Exactly one of `size.0`, `size.1`, and `num_squares` must be [None].
/// Alternatively both sizes may be [None] with `num_squares` given, producing a square meander.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snspd {
    pub wire_width: f64,
    /// Center-to-center spacing between adjacent wires
    pub wire_pitch: f64,
    /// Overall (x, y) extent
    pub size: (Option<f64>, Option<f64>),
    /// Number of squares of wire, as an alternative to one dimension of `size`
    pub num_squares: Option<f64>,
    /// Hairpin turn depth, in wire widths
    pub turn_ratio: f64,
    /// Whether both terminals exit on the same side
    pub terminals_same_side: bool,
}
impl Default for Snspd {
    fn default() -> Self {
        Self {
            wire_width: 0.2,
            wire_pitch: 0.6,
            size: (Some(10.), Some(8.)),
            num_squares: None,
            turn_ratio: 4.,
            terminals_same_side: false,
        }
    }
}
impl Snspd {
    /// Resolve the overall (x, y) size
    fn resolve_size(&self) -> LayoutResult<(f64, f64)> {
        let per_square = self.wire_pitch * self.wire_width;
        match (self.size, self.num_squares) {
            ((None, None), Some(n)) => {
                let xy = (n * per_square).sqrt();
                Ok((xy, xy))
            }
            ((Some(x), Some(y)), None) => Ok((x, y)),
            ((None, Some(y)), Some(n)) => Ok((n * per_square / y, y)),
            ((Some(x), None), Some(n)) => Ok((x, n * per_square / x)),
            _ => LayoutError::invalid(
                "SNSPD requires exactly one of its x-size, y-size, and number of squares be unspecified",
            ),
        }
    }
}

/// # Superconducting Nanowire Meander
///
/// A chain of [optimal_hairpin]s between two terminal wires.
/// Port `1` exits the upper-left terminal facing 180 degrees;
/// port `2` exits the lower terminal, on the right unless `terminals_same_side`.
pub fn snspd(params: &Snspd, layer: impl Into<LayerSpec>) -> LayoutResult<Device> {
    let layer = layer.into();
    positive("SNSPD wire width", params.wire_width)?;
    if !(params.wire_pitch > params.wire_width) || !params.wire_pitch.is_finite() {
        return LayoutError::invalid(format!(
            "SNSPD wire pitch {} must exceed its width {}",
            params.wire_pitch, params.wire_width
        ));
    }
    let (xsize, ysize) = params.resolve_size()?;
    positive("SNSPD x-size", xsize)?;
    positive("SNSPD y-size", ysize)?;
    let mut num_meanders = (ysize / params.wire_pitch).ceil() as usize;
    if params.terminals_same_side == (num_meanders % 2 == 1) {
        num_meanders += 1;
    }
    debug!(
        "SNSPD of size ({}, {}) with {} meanders",
        xsize, ysize, num_meanders
    );
    let hairpin = Arc::new(optimal_hairpin(
        params.wire_width,
        params.wire_pitch,
        xsize / 2.,
        params.turn_ratio,
        20,
        layer,
    )?);
    let terminal = Arc::new(compass((xsize / 2., params.wire_width), layer));

    let mut d = Device::new("snspd");
    let start = d.add_ref(Arc::clone(&terminal));
    let start_e = start.port("E")?;
    let start_w = start.port("W")?;

    let first = d.add_ref(Arc::clone(&hairpin));
    first.connect("1", &start_e, 0)?;
    let (mut prev1, mut prev2) = (first.port("1")?, first.port("2")?);
    let mut last = prev2.clone();
    let mut alternate = true;
    for _ in 2..num_meanders {
        let hp = d.add_ref(Arc::clone(&hairpin));
        if alternate {
            hp.connect("2", &prev2, 0)?;
            last = hp.port("1")?;
        } else {
            hp.connect("1", &prev1, 0)?;
            last = hp.port("2")?;
        }
        prev1 = hp.port("1")?;
        prev2 = hp.port("2")?;
        alternate = !alternate;
    }
    let finish = d.add_ref(terminal);
    finish.connect("E", &last, 0)?;
    let finish_w = finish.port("W")?;

    d.add_port(start_w.renamed("1"));
    d.add_port(finish_w.renamed("2"));
    Ok(d)
}

enumstr!(
    /// # Tee Junction Tapers
    ///
    /// Treatment of the inner corners where a [tee]'s stub meets its bar.
    TeeTaper {
        Straight: "straight",
        Fillet: "fillet",
    }
);

/// # Tee Junction
///
/// Horizontal bar of `size` centered on the origin, with a stub of `stub_size` hanging below it.
/// Ports `1` (east end, 0 degrees), `2` (west end, 180 degrees), and `3` (stub end, 270 degrees).
/// Tapered corners have radius `min(stub height, (bar width - stub width) / 2)`.
pub fn tee(
    size: (f64, f64),
    stub_size: (f64, f64),
    taper: Option<TeeTaper>,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    let layer = layer.into();
    let (sx, sy) = size;
    let (tx, ty) = stub_size;
    positive("Tee bar width", sx)?;
    positive("Tee bar height", sy)?;
    positive("Tee stub width", tx)?;
    positive("Tee stub height", ty)?;

    let mut d = Device::new("tee");
    d.add_rect(Point::um(-sx / 2., -sy / 2.), Point::um(sx / 2., sy / 2.), layer);
    d.add_rect(
        Point::um(-tx / 2., -sy / 2. - ty),
        Point::um(tx / 2., -sy / 2.),
        layer,
    );
    let r = ty.min((sx - tx) / 2.);
    if let (Some(taper), true) = (taper, r > 0.) {
        // Inner corner on the stub's left, and the corner piece filling it
        let (cx, cy) = (-tx / 2., -sy / 2.);
        let left: Vec<(f64, f64)> = match taper {
            TeeTaper::Straight => vec![(cx, cy), (cx - r, cy), (cx, cy - r)],
            TeeTaper::Fillet => {
                let mut pts = vec![(cx, cy)];
                for k in 0..=FILLET_SEGMENTS {
                    let theta = PI / 2. * (1. - k as f64 / FILLET_SEGMENTS as f64);
                    pts.push((cx - r + r * theta.cos(), cy - r + r * theta.sin()));
                }
                pts
            }
        };
        let right: Vec<(f64, f64)> = left.iter().rev().map(|&(x, y)| (-x, y)).collect();
        d.add_polygon(points(&left), layer);
        d.add_polygon(points(&right), layer);
    }
    d.add_port(Port::new("1", Point::um(sx / 2., 0.), um(sy), 0.));
    d.add_port(Port::new("2", Point::um(-sx / 2., 0.), um(sy), 180.));
    d.add_port(Port::new("3", Point::um(0., -sy / 2. - ty), um(tx), 270.));
    Ok(d)
}

/// # U-Shaped Pad Trench
///
/// Encloses a square pad of `pad_width` on three sides with a trench of `width`,
/// leaving it open towards +x. Port `1` sits on the opening at height
/// `pad_width/2 + port_yshift`, faces 0 degrees, and is `pad_width + port_width_add` wide.
pub fn pad_u(
    pad_width: f64,
    width: f64,
    layer: impl Into<LayerSpec>,
    port_yshift: f64,
    port_width_add: f64,
) -> LayoutResult<Device> {
    positive("Pad width", pad_width)?;
    positive("Pad trench width", width)?;
    let layer = layer.into();
    let mut d = Device::new("pad_u");
    d.add_rect(
        Point::um(-width, -width),
        Point::um(0., pad_width + width),
        layer,
    );
    d.add_rect(Point::um(0., -width), Point::um(pad_width, 0.), layer);
    d.add_rect(
        Point::um(0., pad_width),
        Point::um(pad_width, pad_width + width),
        layer,
    );
    d.add_port(Port::new(
        "1",
        Point::um(pad_width, pad_width / 2. + port_yshift),
        um(pad_width + port_width_add),
        0.,
    ));
    Ok(d)
}

/// # Positive-Tone Resistor
///
/// A resistor of `size` (width, length) on `rlayer`, centered on the origin,
/// contacted from above and below by leads of `width` on `layer`.
/// The leads overlap the resistor by `overhang` in total, half at each end,
/// and are outlined by `pos_outline` so that only their trenches are drawn.
/// Port `1` faces up from the top lead, port `2` down from the bottom lead.
pub fn resistor_pos(
    size: (f64, f64),
    width: f64,
    overhang: f64,
    pos_outline: f64,
    layer: impl Into<LayerSpec>,
    rlayer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    let (layer, rlayer) = (layer.into(), rlayer.into());
    let (rw, rl) = size;
    positive("Resistor width", rw)?;
    positive("Resistor length", rl)?;
    positive("Resistor lead width", width)?;
    if overhang < 0. || overhang >= rl {
        return LayoutError::invalid(format!(
            "Resistor overhang {} must lie in [0, {})",
            overhang, rl
        ));
    }
    let gap = rl - overhang;
    let mut leads = Device::new("resistor_leads");
    leads.add_rect(
        Point::um(-width / 2., gap / 2.),
        Point::um(width / 2., rl / 2. + width),
        layer,
    );
    leads.add_rect(
        Point::um(-width / 2., -rl / 2. - width),
        Point::um(width / 2., -gap / 2.),
        layer,
    );
    leads.add_port(Port::new("1", Point::um(0., rl / 2. + width), um(width), 90.));
    leads.add_port(Port::new("2", Point::um(0., -rl / 2. - width), um(width), 270.));
    let leads = outline(
        &leads,
        &OutlineOpts {
            distance: pos_outline,
            open_ports: Some(2.),
            rotate_ports: false,
            layer,
        },
    )?;

    let mut d = Device::new("resistor_pos");
    d.add_rect(Point::um(-rw / 2., -rl / 2.), Point::um(rw / 2., rl / 2.), rlayer);
    d.elems.extend(leads.elems);
    for port in leads.ports {
        d.add_port(port);
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{BoundBox, BoundBoxTrait};
    use crate::utils::EnumStr;

    #[test]
    fn compass_ports() {
        let d = compass((4., 2.), 1);
        assert_eq!(
            d.bbox(),
            BoundBox::from_points(Point::new(-2000, -1000), Point::new(2000, 1000))
        );
        let e = d.port("E").unwrap();
        assert_eq!((e.midpoint, e.width, e.orientation), (Point::new(2000, 0), 2000, 0.));
        let n = d.port("N").unwrap();
        assert_eq!((n.midpoint, n.width, n.orientation), (Point::new(0, 1000), 4000, 90.));
        assert_eq!(d.port("S").unwrap().orientation, 270.);
        assert_eq!(d.port("W").unwrap().midpoint, Point::new(-2000, 0));
    }
    #[test]
    fn straight_and_rectangle() {
        let s = straight((0.5, 10.), 1);
        assert_eq!(s.port("1").unwrap().midpoint, Point::new(250, 10_000));
        assert_eq!(s.port("2").unwrap().midpoint, Point::new(250, 0));
        assert_eq!(s.port("2").unwrap().width, 500);
        let r = rectangle((3., 2.), 4);
        assert_eq!(
            r.bbox(),
            BoundBox::from_points(Point::new(0, 0), Point::new(3000, 2000))
        );
    }
    #[test]
    fn hyper_taper_profile() -> LayoutResult<()> {
        let d = hyper_taper(1., 10., 0.2, 1)?;
        let polys = d.all_polygons()?;
        assert_eq!(polys.len(), 1);
        // Eleven samples per side, at 0.0, 0.1, ... 1.0
        assert_eq!(polys[0].points.len(), 22);
        assert_eq!(
            d.bbox(),
            BoundBox::from_points(Point::new(0, -5000), Point::new(1000, 5000))
        );
        assert_eq!(polys[0].points[0], Point::new(0, 100));
        let narrow = d.port("narrow")?;
        assert_eq!((narrow.width, narrow.orientation), (200, 180.));
        let wide = d.port("wide")?;
        assert_eq!((wide.midpoint, wide.width), (Point::new(1000, 0), 10_000));

        assert!(hyper_taper(1., 0.1, 0.2, 1).is_err());
        assert!(hyper_taper(0., 10., 0.2, 1).is_err());
        Ok(())
    }
    #[test]
    fn square_step() -> LayoutResult<()> {
        let d = optimal_step(&OptimalStep::new(2., 2.), 1)?;
        assert_eq!(
            d.bbox(),
            BoundBox::from_points(Point::new(0, 0), Point::new(2000, 2000))
        );
        assert_eq!(d.port("1")?.midpoint, Point::new(0, 1000));
        assert_eq!(d.port("2")?.midpoint, Point::new(2000, 1000));
        Ok(())
    }
    #[test]
    fn optimal_steps() -> LayoutResult<()> {
        let up = optimal_step(&OptimalStep::new(1., 4.), 1)?;
        let (p1, p2) = (up.port("1")?, up.port("2")?);
        assert_eq!((p1.width, p1.orientation), (1000, 180.));
        assert_eq!((p2.width, p2.orientation), (4000, 0.));
        assert!(p1.midpoint.x < p2.midpoint.x);
        let bbox = up.bbox();
        assert_eq!((bbox.p0.y, bbox.p1.y), (0, 4000));

        // Narrowing steps keep port `1` on the left
        let down = optimal_step(&OptimalStep::new(4., 1.), 1)?;
        let (p1, p2) = (down.port("1")?, down.port("2")?);
        assert_eq!((p1.width, p2.width), (4000, 1000));
        assert!(p1.midpoint.x < p2.midpoint.x);

        let sym = optimal_step(
            &OptimalStep {
                symmetric: true,
                ..OptimalStep::new(1., 4.)
            },
            1,
        )?;
        let bbox = sym.bbox();
        assert_eq!((bbox.p0.y, bbox.p1.y), (-2000, 2000));
        assert_eq!(sym.port("1")?.midpoint.y, 0);
        assert_eq!(sym.port("2")?.midpoint.y, 0);

        assert!(optimal_step(&OptimalStep::new(0., 4.), 1).is_err());
        Ok(())
    }
    #[test]
    fn bend_ports() -> LayoutResult<()> {
        let d = optimal_90deg(1., 15, 1., 1)?;
        let (p1, p2) = (d.port("1")?, d.port("2")?);
        assert_eq!((p1.width, p1.orientation), (1000, 90.));
        assert_eq!((p2.width, p2.orientation), (1000, 0.));
        assert_eq!(p1.midpoint.x, 500);
        assert_eq!(p2.midpoint.y, 500);
        // Both ports sit on the bounding box
        let bbox = d.bbox();
        assert_eq!(p1.midpoint.y, bbox.p1.y);
        assert_eq!(p2.midpoint.x, bbox.p1.x);
        Ok(())
    }
    #[test]
    fn hairpin_ports() -> LayoutResult<()> {
        let d = optimal_hairpin(0.2, 0.6, 5., 4., 20, 1)?;
        let (p1, p2) = (d.port("1")?, d.port("2")?);
        assert_eq!(p1.midpoint.x, p2.midpoint.x);
        assert_eq!(p1.midpoint.y, 300);
        assert_eq!(p2.midpoint.y, -300);
        assert_eq!((p1.orientation, p2.orientation), (180., 180.));
        let bbox = d.bbox();
        assert_eq!(bbox.p0.x, p1.midpoint.x);
        assert_eq!((bbox.p0.y, bbox.p1.y), (-400, 400));
        assert_eq!(d.elems.len(), 2);

        assert!(optimal_hairpin(0.2, 0.2, 5., 4., 20, 1).is_err());
        assert!(optimal_hairpin(0.2, 0.6, 0.5, 4., 20, 1).is_err());
        Ok(())
    }
    #[test]
    fn snspd_terminals() -> LayoutResult<()> {
        let d = snspd(&Snspd::default(), 1)?;
        // ceil(8 / 0.6) = 14 meanders, made odd: two terminals and 14 hairpins
        assert_eq!(d.insts.len(), 16);
        assert_eq!(d.port("1")?.orientation, 180.);
        assert_eq!(d.port("2")?.orientation, 0.);
        assert!(d.port("1")?.midpoint.x < d.port("2")?.midpoint.x);
        assert!(d.port("1")?.midpoint.y > d.port("2")?.midpoint.y);

        let same = snspd(
            &Snspd {
                terminals_same_side: true,
                ..Default::default()
            },
            1,
        )?;
        assert_eq!(same.port("2")?.orientation, 180.);
        assert_eq!(same.port("1")?.midpoint.x, same.port("2")?.midpoint.x);
        Ok(())
    }
    #[test]
    fn snspd_sizing() -> LayoutResult<()> {
        let over = Snspd {
            num_squares: Some(100.),
            ..Default::default()
        };
        assert!(snspd(&over, 1).is_err());
        let under = Snspd {
            size: (Some(10.), None),
            ..Default::default()
        };
        assert!(snspd(&under, 1).is_err());
        let by_squares = Snspd {
            size: (None, None),
            num_squares: Some(1000.),
            ..Default::default()
        };
        let side = (1000. * (0.6 * 0.2f64)).sqrt();
        assert_eq!(by_squares.resolve_size()?, (side, side));
        Ok(())
    }
    #[test]
    fn snspd_wire_checks() {
        for (wire_width, wire_pitch) in [(0., 0.), (0.2, 0.), (0.2, 0.2), (-0.1, 0.6)] {
            let params = Snspd {
                wire_width,
                wire_pitch,
                terminals_same_side: true,
                ..Default::default()
            };
            assert!(snspd(&params, 1).is_err());
        }
    }
    #[test]
    fn tee_shapes() -> LayoutResult<()> {
        let plain = tee((4., 1.), (2., 2.), None, 1)?;
        assert_eq!(plain.elems.len(), 2);
        let p3 = plain.port("3")?;
        assert_eq!((p3.midpoint, p3.width, p3.orientation), (Point::new(0, -2500), 2000, 270.));
        assert_eq!(plain.port("1")?.midpoint, Point::new(2000, 0));
        assert_eq!(plain.port("2")?.orientation, 180.);

        for taper in TeeTaper::all() {
            let d = tee((4., 1.), (2., 2.), Some(*taper), 1)?;
            assert_eq!(d.elems.len(), 4);
            // Corner pieces stay within the bar's extent
            assert_eq!(d.bbox(), plain.bbox());
        }
        Ok(())
    }
    #[test]
    fn pad_u_opening() -> LayoutResult<()> {
        let d = pad_u(200., 10., 2, -10., 5.)?;
        assert_eq!(
            d.bbox(),
            BoundBox::from_points(Point::um(-10., -10.), Point::um(200., 210.))
        );
        let p = d.port("1")?;
        assert_eq!(p.midpoint, Point::um(200., 90.));
        assert_eq!((p.width, p.orientation), (um(205.), 0.));
        // The pad itself is left open
        assert!(d.all_polygons()?.iter().all(|poly| {
            !poly.bbox().contains(&Point::um(100., 100.))
        }));
        Ok(())
    }
    #[test]
    fn resistor_ports_and_layers() -> LayoutResult<()> {
        let d = resistor_pos((1., 6.), 3., 2., 0.2, 1, 3)?;
        assert_eq!(d.layers(), vec![LayerSpec::new(1, 0), LayerSpec::new(3, 0)]);
        let (p1, p2) = (d.port("1")?, d.port("2")?);
        assert_eq!((p1.midpoint, p1.orientation), (Point::um(0., 6.), 90.));
        assert_eq!((p2.midpoint, p2.orientation), (Point::um(0., -6.), 270.));
        assert_eq!(p1.width, 3000);
        assert!(resistor_pos((1., 6.), 3., 6., 0.2, 1, 3).is_err());
        Ok(())
    }
}
