//!
//! # Device Families
//!
//! Complete, padded test structures for bilayer (positive-tone wire, separate pad layer) processes.
//! Each family generates one [TestDevice] per entry of its parameter sweeps, collected into a [Sweep].
//!
//! All families are assembled the same way: trenches are [outline]d around each wire piece,
//! the pieces are moved port-to-port, merged onto a single layer, and joined by their pads.
//!

// Crates.io
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// Local imports
use crate::calc::{reset_time_calc, squares_meander_calc, ResetTimeInput};
use crate::meander::{meander, Meander};
use crate::outline::{outline, OutlineOpts};
use crate::params::*;
use crate::primitives::{
    hyper_taper, optimal_90deg, optimal_step, pad_u, resistor_pos, straight, tee, OptimalStep,
    TeeTaper,
};
use crate::raw::{
    um, BoundBoxTrait, Device, LayerSpec, LayoutError, LayoutResult, Placement, Point, Port,
};
use crate::routing::route_manhattan;
use crate::utils::{enumstr, ErrorContext, ErrorHelper, SerdeFile};

/// Width of the trench surrounding each pad
const PAD_TRENCH: f64 = 10.;
/// Distance each pad taper reaches into its pad
const PAD_INSET: f64 = 10.;
/// Sample count of the steps into and out of straight inductors
const STEP_PTS: usize = 100;
/// Sample count and extent of detector bends
const BEND_PTS: usize = 15;
const BEND_LENGTH_ADJUST: f64 = 1.;
/// Ratio of taper-end to wire width, for straight wires and resistors
const WIRE_STEP_SCALE: f64 = 4.;
/// Ratio of taper-end to wire width, for four-point probes
const PROBE_STEP_SCALE: f64 = 10.;
/// Name of the per-device square count, as listed among its parameters
pub const SQUARES_PARAM: &str = "snspd_squares";

enumstr!(
    /// # Device Families
    Family {
        SnspdPad: "snspd_pad_bilayer",
        Snspd2Pad: "snspd_2pad_bilayer",
        StraightSnspdPad: "straight_snspd_pad_bilayer",
        StraightSnspd2Pad: "straight_snspd_2pad_bilayer",
        StraightWire: "straight_wire_pad_bilayer",
        Resistor: "resistor_pad_bilayer",
        FourPoint: "four_point_wire",
    }
);
impl Family {
    /// Default parameters for this family
    pub fn defaults(&self) -> FamilyParams {
        match self {
            Self::SnspdPad => FamilyParams::SnspdPad(Default::default()),
            Self::Snspd2Pad => FamilyParams::Snspd2Pad(Default::default()),
            Self::StraightSnspdPad => FamilyParams::StraightSnspdPad(Default::default()),
            Self::StraightSnspd2Pad => FamilyParams::StraightSnspd2Pad(Default::default()),
            Self::StraightWire => FamilyParams::StraightWire(Default::default()),
            Self::Resistor => FamilyParams::Resistor(Default::default()),
            Self::FourPoint => FamilyParams::FourPoint(Default::default()),
        }
    }
}

///
/// # Family Parameters
///
/// Selects a family by name, through its `family` field, alongside that family's parameters.
///
/// ```yaml
/// family: straight_wire_pad_bilayer
/// straight_width: [0.1, 0.2]
/// straight_length: [40, 80]
/// ```
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "family")]
pub enum FamilyParams {
    #[serde(rename = "snspd_pad_bilayer")]
    SnspdPad(SnspdPadParams),
    #[serde(rename = "snspd_2pad_bilayer")]
    Snspd2Pad(Snspd2PadParams),
    #[serde(rename = "straight_snspd_pad_bilayer")]
    StraightSnspdPad(StraightSnspdPadParams),
    #[serde(rename = "straight_snspd_2pad_bilayer")]
    StraightSnspd2Pad(StraightSnspd2PadParams),
    #[serde(rename = "straight_wire_pad_bilayer")]
    StraightWire(StraightWireParams),
    #[serde(rename = "resistor_pad_bilayer")]
    Resistor(ResistorParams),
    #[serde(rename = "four_point_wire")]
    FourPoint(FourPointParams),
}
impl FamilyParams {
    /// Get our [Family]
    pub fn family(&self) -> Family {
        match self {
            Self::SnspdPad(_) => Family::SnspdPad,
            Self::Snspd2Pad(_) => Family::Snspd2Pad,
            Self::StraightSnspdPad(_) => Family::StraightSnspdPad,
            Self::StraightSnspd2Pad(_) => Family::StraightSnspd2Pad,
            Self::StraightWire(_) => Family::StraightWire,
            Self::Resistor(_) => Family::Resistor,
            Self::FourPoint(_) => Family::FourPoint,
        }
    }
    /// Generate the sweep
    pub fn build(&self) -> LayoutResult<Sweep> {
        match self {
            Self::SnspdPad(p) => snspd_pad_bilayer(p),
            Self::Snspd2Pad(p) => snspd_2pad_bilayer(p),
            Self::StraightSnspdPad(p) => straight_snspd_pad_bilayer(p),
            Self::StraightSnspd2Pad(p) => straight_snspd_2pad_bilayer(p),
            Self::StraightWire(p) => straight_wire_pad_bilayer(p),
            Self::Resistor(p) => resistor_pad_bilayer(p),
            Self::FourPoint(p) => four_point_wire(p),
        }
    }
}
impl SerdeFile for FamilyParams {}

/// # Test Device
/// One generated device, with the estimates and parameters it was built from
#[derive(Debug, Clone)]
pub struct TestDevice {
    pub device: Device,
    /// Device type, as listed in device documents
    pub kind: String,
    /// Wire width, in micrometers
    pub width: Option<f64>,
    /// Meander area, in micrometers
    pub area: Option<f64>,
    /// Estimated number of squares
    pub squares: f64,
    /// Swept parameter values, in declaration order, followed by [SQUARES_PARAM]
    pub params: Vec<(String, f64)>,
}

/// # Sweep
/// The devices of one family, one per sweep entry
#[derive(Debug, Clone, Default)]
pub struct Sweep {
    pub devices: Vec<TestDevice>,
    /// Swept square counts, one per device
    pub squares: Vec<f64>,
}
impl Sweep {
    /// Add `dev`, tagging it with entry `idx` of every sweep in `params`
    fn push(&mut self, params: &impl Sweeps, idx: usize, mut dev: TestDevice, squares: f64) {
        dev.params = params
            .sweeps()
            .iter()
            .map(|(name, values)| (name.to_string(), values[idx]))
            .collect();
        dev.params.push((SQUARES_PARAM.to_string(), squares));
        self.squares.push(squares);
        self.devices.push(dev);
    }
}

/// Builder state for one device of a family, reported on failure
struct Assembly {
    family: Family,
    index: usize,
}
impl Assembly {
    fn new(family: Family, index: usize) -> Self {
        Self { family, index }
    }
    fn ctx(&self) -> ErrorContext {
        ErrorContext::Family(format!("{}[{}]", self.family, self.index))
    }
    /// Attach our context to error `e`
    fn context(&self, e: LayoutError) -> LayoutError {
        e.context(self.ctx())
    }
}
impl ErrorHelper for Assembly {
    type Error = LayoutError;
    /// Context is attached by [Assembly::context], as errors leave each device's build
    fn err(&self, msg: impl Into<String>) -> Self::Error {
        LayoutError::validation(msg)
    }
}

/// Common sweep length of `params`, with `family` context on failure
fn sweep_len(family: Family, params: &impl Sweeps) -> LayoutResult<usize> {
    params
        .sweep_len()
        .map_err(|e| e.context(ErrorContext::Family(family.to_string())))
}

/// Trench of `distance` around `device`, opened at its ports
fn trench(
    device: &Device,
    distance: f64,
    open: f64,
    layer: impl Into<LayerSpec>,
) -> LayoutResult<Device> {
    outline(device, &OutlineOpts::new(distance, layer).open_ports(open))
}

/// Outlined [meander] detector facing east-west, and its square count
fn detector(
    a: &Assembly,
    width: f64,
    fill: f64,
    area: f64,
    outline_width: f64,
    layer: LayerSpec,
) -> LayoutResult<(Device, f64)> {
    a.assert(
        fill > 0. && fill < 1.,
        format!("snspd_fill {} must lie strictly between 0 and 1", fill),
    )?;
    let pitch = width / fill - width;
    let m = meander(&Meander::new(width, pitch, area), layer)?;
    let squares = squares_meander_calc(width, area, pitch);
    Ok((trench(&m, outline_width, 2., layer)?, squares))
}

/// Pad opening westward, and its taper narrowing westward to `narrow`
fn east_pad(
    params: &PadGeometry,
    narrow: f64,
    outline_width: f64,
    layer: LayerSpec,
) -> LayoutResult<(Device, Device)> {
    let mut pad = pad_u(params.width, PAD_TRENCH, params.layer, 0., 0.)?;
    pad.rotate(180.);
    let ht = hyper_taper(params.taper_length, params.width + params.outline, narrow, layer)?;
    let mut taper = trench(&ht, outline_width, 2., layer)?;
    taper
        .move_port("wide", pad.port("1")?.midpoint)?
        .movex(um(PAD_INSET));
    Ok((pad, taper))
}

/// Pad opening eastward, with its taper's narrow end on `dest`
fn west_pad(
    params: &PadGeometry,
    narrow: f64,
    outline_width: f64,
    layer: LayerSpec,
    dest: &Port,
) -> LayoutResult<(Device, Device)> {
    let ht = hyper_taper(params.taper_length, params.width + params.outline, narrow, layer)?;
    let mut taper = trench(&ht, outline_width, 2., layer)?;
    taper.rotate(180.);
    taper.move_port("narrow", dest.midpoint)?;
    let mut pad = pad_u(params.width, PAD_TRENCH, params.layer, 0., 0.)?;
    pad.move_port("1", taper.port("wide")?.midpoint)?
        .movex(um(PAD_INSET));
    Ok((pad, taper))
}

/// Outlined ground taper, rotated by `angle`, with its narrow end on `dest`
fn ground_taper(
    length: f64,
    wide: f64,
    narrow: f64,
    outline_width: f64,
    layer: LayerSpec,
    angle: f64,
    dest: &Port,
) -> LayoutResult<Device> {
    let mut taper = trench(&hyper_taper(length, wide, narrow, layer)?, outline_width, 2., layer)?;
    taper.rotate(angle);
    taper.move_port("narrow", dest.midpoint)?;
    Ok(taper)
}

/// Pad dimensions shared by every padded family
struct PadGeometry {
    width: f64,
    outline: f64,
    taper_length: f64,
    layer: LayerSpec,
}

/// Bend off the detector, step down into a straight inductor, and step back up.
/// Hangs below port `start`; returns its pieces and free end.
fn inductor_chain(
    width: f64,
    straight_width: f64,
    straight_length: f64,
    outline_width: f64,
    layer: LayerSpec,
    start: &Port,
) -> LayoutResult<(Vec<Device>, Port)> {
    let bend = optimal_90deg(width, BEND_PTS, BEND_LENGTH_ADJUST, layer)?;
    let mut bend1 = trench(&bend, outline_width, 2., layer)?;
    bend1.rotate(-90.);
    bend1.move_port("1", start.midpoint)?;

    let down = OptimalStep {
        num_pts: STEP_PTS,
        ..OptimalStep::new(straight_width, width)
    };
    let mut step1 = trench(&optimal_step(&down, layer)?, outline_width, 3., layer)?;
    step1.rotate(90.);
    step1.move_port("2", bend1.port("2")?.midpoint)?;

    let mut wire = trench(
        &straight((straight_width, straight_length), layer),
        outline_width,
        2.,
        layer,
    )?;
    wire.move_port("1", step1.port("1")?.midpoint)?;

    let up = OptimalStep {
        num_pts: STEP_PTS,
        ..OptimalStep::new(width, straight_width)
    };
    let mut step2 = trench(&optimal_step(&up, layer)?, outline_width, 3., layer)?;
    step2.rotate(90.);
    step2.move_port("2", wire.port("2")?.midpoint)?;

    let mut bend2 = trench(&bend, outline_width, 3., layer)?;
    bend2.rotate(90.);
    bend2.move_port("2", step2.port("1")?.midpoint)?;
    let end = bend2.port("1")?;
    Ok((vec![bend1, step1, wire, step2, bend2], end))
}

/// Merge `traces` onto `layer`, add `pads` as instances, rotate by `angle`,
/// and move the result's bounding box to the origin
fn assemble(
    name: &str,
    traces: Vec<Device>,
    layer: LayerSpec,
    pads: Vec<Device>,
    angle: f64,
) -> LayoutResult<Device> {
    let mut d = Device::new(name);
    for t in traces {
        d.add_ref(t);
    }
    d.flatten_to_layer(layer);
    for p in pads {
        d.add_ref(p);
    }
    d.rotate(angle);
    d.move_bbox_to_origin()?;
    Ok(d)
}

/// # Meander Detector with One Pad
///
/// An outlined meander between a pad (by way of a hyperbolic taper) and a ground taper.
pub fn snspd_pad_bilayer(params: &SnspdPadParams) -> LayoutResult<Sweep> {
    let family = Family::SnspdPad;
    let n = sweep_len(family, params)?;
    let layer = LayerSpec::from(params.snspd_layer);
    let geom = PadGeometry {
        width: params.pad_width,
        outline: params.pad_outline,
        taper_length: params.pad_taper_length,
        layer: params.pad_layer.into(),
    };
    let mut sweep = Sweep::default();
    for i in 0..n {
        let a = Assembly::new(family, i);
        let (width, area) = (params.snspd_width[i], params.snspd_area[i]);
        let build = || -> LayoutResult<(Device, f64)> {
            let (mut det, squares) =
                detector(&a, width, params.snspd_fill, area, params.snspd_outline, layer)?;
            let (pad, taper) = east_pad(&geom, width, params.snspd_outline, layer)?;
            det.move_port("2", taper.port("narrow")?.midpoint)?;
            let ground = ground_taper(
                params.ground_taper_length,
                params.ground_taper_width,
                width,
                params.snspd_outline,
                layer,
                180.,
                &det.port("1")?,
            )?;
            let d = assemble("snspd", vec![taper, det, ground], layer, vec![pad], -90.)?;
            Ok((d, squares))
        };
        let (device, squares) = build().map_err(|e| a.context(e))?;
        log_reset_time(squares, params.sheet_inductance);
        let dev = TestDevice {
            device,
            kind: "meander_snspd".into(),
            width: Some(width),
            area: Some(area),
            squares,
            params: Vec::new(),
        };
        sweep.push(params, i, dev, squares);
    }
    Ok(sweep)
}

/// # Meander Detector between Two Pads
pub fn snspd_2pad_bilayer(params: &Snspd2PadParams) -> LayoutResult<Sweep> {
    let family = Family::Snspd2Pad;
    let n = sweep_len(family, params)?;
    let layer = LayerSpec::from(params.snspd_layer);
    let geom = PadGeometry {
        width: params.pad_width,
        outline: params.pad_outline,
        taper_length: params.pad_taper_length,
        layer: params.pad_layer.into(),
    };
    let mut sweep = Sweep::default();
    for i in 0..n {
        let a = Assembly::new(family, i);
        let (width, area) = (params.snspd_width[i], params.snspd_area[i]);
        let build = || -> LayoutResult<(Device, f64)> {
            let (mut det, squares) =
                detector(&a, width, params.snspd_fill, area, params.snspd_outline, layer)?;
            let (pad1, taper1) = east_pad(&geom, width, params.snspd_outline, layer)?;
            det.move_port("2", taper1.port("narrow")?.midpoint)?;
            let (pad2, taper2) =
                west_pad(&geom, width, params.snspd_outline, layer, &det.port("1")?)?;
            let d = assemble(
                "snspd",
                vec![taper1, det, taper2],
                layer,
                vec![pad1, pad2],
                -90.,
            )?;
            Ok((d, squares))
        };
        let (device, squares) = build().map_err(|e| a.context(e))?;
        log_reset_time(squares, params.sheet_inductance);
        let dev = TestDevice {
            device,
            kind: "meander_snspd_diff".into(),
            width: Some(width),
            area: Some(area),
            squares,
            params: Vec::new(),
        };
        sweep.push(params, i, dev, squares);
    }
    Ok(sweep)
}

/// # Meander Detector in Series with a Straight Inductor, One Pad
pub fn straight_snspd_pad_bilayer(params: &StraightSnspdPadParams) -> LayoutResult<Sweep> {
    let family = Family::StraightSnspdPad;
    let n = sweep_len(family, params)?;
    let layer = LayerSpec::from(params.snspd_layer);
    let geom = PadGeometry {
        width: params.pad_width,
        outline: params.pad_outline,
        taper_length: params.pad_taper_length,
        layer: params.pad_layer.into(),
    };
    let mut sweep = Sweep::default();
    for i in 0..n {
        let a = Assembly::new(family, i);
        let (width, area) = (params.snspd_width[i], params.snspd_area[i]);
        let (sw, sl) = (params.straight_width[i], params.straight_length[i]);
        let build = || -> LayoutResult<(Device, f64)> {
            let ow = params.snspd_outline;
            let (mut det, meander_squares) =
                detector(&a, width, params.snspd_fill, area, ow, layer)?;
            let (pad, taper) = east_pad(&geom, width, ow, layer)?;
            det.move_port("2", taper.port("narrow")?.midpoint)?;
            let (chain, end) = inductor_chain(width, sw, sl, ow, layer, &det.port("1")?)?;
            let ground = ground_taper(
                params.ground_taper_length,
                params.ground_taper_width,
                width,
                ow,
                layer,
                180.,
                &end,
            )?;
            let mut traces = vec![taper, det];
            traces.extend(chain);
            traces.push(ground);
            let d = assemble("snspd", traces, layer, vec![pad], -90.)?;
            Ok((d, meander_squares))
        };
        let (device, meander_squares) = build().map_err(|e| a.context(e))?;
        let straight_squares = sl / sw;
        info!(
            "Straight squares {:.0}, inductor squares {:.0}",
            straight_squares, meander_squares
        );
        let squares = meander_squares + straight_squares;
        log_reset_time(squares, params.sheet_inductance);
        let dev = TestDevice {
            device,
            kind: "straight_snspd".into(),
            width: Some(width),
            area: Some(area),
            squares,
            params: Vec::new(),
        };
        sweep.push(params, i, dev, squares);
    }
    Ok(sweep)
}

/// # Meander Detector in Series with a Straight Inductor, Two Pads
pub fn straight_snspd_2pad_bilayer(params: &StraightSnspd2PadParams) -> LayoutResult<Sweep> {
    let family = Family::StraightSnspd2Pad;
    let n = sweep_len(family, params)?;
    let layer = LayerSpec::from(params.snspd_layer);
    let geom = PadGeometry {
        width: params.pad_width,
        outline: params.pad_outline,
        taper_length: params.pad_taper_length,
        layer: params.pad_layer.into(),
    };
    let mut sweep = Sweep::default();
    for i in 0..n {
        let a = Assembly::new(family, i);
        let (width, area) = (params.snspd_width[i], params.snspd_area[i]);
        let (sw, sl) = (params.straight_width[i], params.straight_length[i]);
        let build = || -> LayoutResult<(Device, f64)> {
            let ow = params.snspd_outline;
            let (mut det, meander_squares) =
                detector(&a, width, params.snspd_fill, area, ow, layer)?;
            let (pad1, taper1) = east_pad(&geom, width, ow, layer)?;
            det.move_port("2", taper1.port("narrow")?.midpoint)?;
            let (chain, end) = inductor_chain(width, sw, sl, ow, layer, &det.port("1")?)?;
            let (pad2, taper2) = west_pad(&geom, width, ow, layer, &end)?;
            let mut traces = vec![taper1, det];
            traces.extend(chain);
            traces.push(taper2);
            let d = assemble("snspd", traces, layer, vec![pad1, pad2], -90.)?;
            Ok((d, meander_squares))
        };
        let (device, meander_squares) = build().map_err(|e| a.context(e))?;
        let squares = meander_squares + sl / sw;
        log_reset_time(squares, params.sheet_inductance);
        let dev = TestDevice {
            device,
            kind: "straight_snspd_diff".into(),
            width: Some(width),
            area: Some(area),
            squares,
            params: Vec::new(),
        };
        sweep.push(params, i, dev, squares);
    }
    Ok(sweep)
}

/// # Straight Wire with One Pad
///
/// A straight wire stepped up to four times its width at both ends,
/// between a pad taper and a ground taper.
pub fn straight_wire_pad_bilayer(params: &StraightWireParams) -> LayoutResult<Sweep> {
    let family = Family::StraightWire;
    let n = sweep_len(family, params)?;
    let layer = LayerSpec::from(params.straight_layer);
    let geom = PadGeometry {
        width: params.pad_width,
        outline: params.pad_outline,
        taper_length: params.pad_taper_length,
        layer: params.pad_layer.into(),
    };
    let mut sweep = Sweep::default();
    for i in 0..n {
        let a = Assembly::new(family, i);
        let (sw, sl) = (params.straight_width[i], params.straight_length[i]);
        let build = || -> LayoutResult<Device> {
            let ow = params.straight_outline;
            let wide = sw * WIRE_STEP_SCALE;
            let (pad, taper) = east_pad(&geom, wide, ow, layer)?;
            let step = optimal_step(&OptimalStep::new(wide, sw), layer)?;

            let mut step1 = trench(&step, ow, 3., layer)?;
            step1.rotate(180.);
            step1.move_port("1", taper.port("narrow")?.midpoint)?;
            let mut wire = trench(&straight((sw, sl), layer), ow, 2., layer)?;
            wire.rotate(90.);
            wire.move_port("2", step1.port("2")?.midpoint)?;
            let mut step2 = trench(&step, ow, 3., layer)?;
            step2.move_port("2", wire.port("1")?.midpoint)?;
            let ground = ground_taper(
                params.ground_taper_length,
                params.ground_taper_width,
                wide,
                ow,
                layer,
                180.,
                &step2.port("1")?,
            )?;
            let traces = vec![taper, wire, step1, step2, ground];
            assemble("wire", traces, layer, vec![pad], -90.)
        };
        let device = build().map_err(|e| a.context(e))?;
        let squares = sl / sw;
        log_reset_time(squares, params.sheet_inductance);
        let dev = TestDevice {
            device,
            kind: "straight_wire".into(),
            width: Some(sw),
            area: None,
            squares,
            params: Vec::new(),
        };
        sweep.push(params, i, dev, squares);
    }
    Ok(sweep)
}

/// # Thin-Film Resistor with One Pad
///
/// A [resistor_pos] between symmetric steps, with a pad above and a ground taper below.
/// The estimated squares exclude the lead overlap; the swept squares do not.
pub fn resistor_pad_bilayer(params: &ResistorParams) -> LayoutResult<Sweep> {
    let family = Family::Resistor;
    let n = sweep_len(family, params)?;
    let layer = LayerSpec::from(params.straight_layer);
    let (sw, ow) = (params.straight_width, params.straight_outline);
    let mut sweep = Sweep::default();
    for i in 0..n {
        let a = Assembly::new(family, i);
        let (rw, rl) = (params.r_width[i], params.r_length[i]);
        let build = || -> LayoutResult<Device> {
            let r = resistor_pos((rw, rl), sw, params.r_over, ow, layer, params.r_layer)?;
            let wide = sw * WIRE_STEP_SCALE;
            let step = optimal_step(
                &OptimalStep {
                    symmetric: true,
                    ..OptimalStep::new(wide, sw)
                },
                layer,
            )?;
            let mut step1 = trench(&step, ow, ow, layer)?;
            step1.rotate(-90.);
            step1.move_port("2", r.port("1")?.midpoint)?;
            let mut step2 = trench(&step, ow, ow, layer)?;
            step2.rotate(90.);
            step2.move_port("2", r.port("2")?.midpoint)?;

            let ht = hyper_taper(
                params.pad_taper_length,
                params.pad_width + params.pad_outline,
                wide,
                layer,
            )?;
            let mut taper = trench(&ht, ow, ow, layer)?;
            taper.rotate(-90.);
            taper.move_port("narrow", step2.port("1")?.midpoint)?;
            let mut pad = pad_u(params.pad_width, PAD_TRENCH, params.pad_layer, 0., 0.)?;
            pad.rotate(90.);
            pad.move_port("1", taper.port("wide")?.midpoint)?
                .movey(um(PAD_INSET));
            let ground = ground_taper(
                params.ground_taper_length,
                params.ground_taper_width,
                wide,
                ow,
                layer,
                90.,
                &step1.port("1")?,
            )?;

            let mut d = Device::new("resistor");
            for piece in [r, step1, step2, taper, pad, ground] {
                d.add_ref(piece);
            }
            d.flatten();
            d.move_bbox_to_origin()?;
            Ok(d)
        };
        let device = build().map_err(|e| a.context(e))?;
        let squares = (rl - params.r_over) / rw;
        info!(
            "Squares {}, resistance {}",
            squares,
            squares * params.sheet_resistance
        );
        let dev = TestDevice {
            device,
            kind: "resistor".into(),
            width: None,
            area: None,
            squares,
            params: Vec::new(),
        };
        sweep.push(params, i, dev, rl / rw);
    }
    Ok(sweep)
}

/// # Four-Point Probe Wire
///
/// A straight wire with a tee at each end. Each tee's stub and arm step out to its own pad,
/// so that current and voltage are probed separately. Four pads sit in a row below the wire.
pub fn four_point_wire(params: &FourPointParams) -> LayoutResult<Sweep> {
    let family = Family::FourPoint;
    let n = sweep_len(family, params)?;
    let layer = LayerSpec::from(params.straight_layer);
    let ow = params.straight_outline;
    let mut sweep = Sweep::default();
    for i in 0..n {
        let a = Assembly::new(family, i);
        let (sw, sl) = (params.straight_width[i], params.straight_length[i]);
        let build = || -> LayoutResult<Device> {
            let wide = sw * PROBE_STEP_SCALE;
            let pw = params.pad_width;
            let ht = hyper_taper(params.pad_taper_length, pw + params.pad_outline, wide, layer)?;
            let taper = trench(&ht, ow, 2., layer)?;

            // Pads in a row, each with a taper narrowing upward
            let mut pads = Device::new("pads");
            let mut traces = Vec::new();
            let mut taper_ends = Vec::new();
            for z in 0..4 {
                let mut pad = pad_u(
                    pw,
                    params.pad_outline,
                    params.pad_layer,
                    -10.,
                    params.pad_outline / 2.,
                )?;
                pad.rotate(90.);
                let p0 = pad.bbox().non_empty("pad")?.p0;
                pad.move_to(p0, Point::um(pw * z as f64 * 1.2, 0.));
                let mut t = taper.clone();
                t.rotate(-90.);
                t.move_port("wide", pad.port("1")?.midpoint)?;
                taper_ends.push(t.port("narrow")?);
                traces.push(t);
                pads.add_ref(pad);
            }

            let mut wire = trench(&straight((sw, sl), layer), ow, 2., layer)?;
            wire.rotate(90.);
            let (from, to) = (wire.center()?, pads.center()?);
            wire.move_to(from, to).movey(um(pw * 1.25));

            let t = tee((sw * 4., sw), (sw * 2., sw * 2.), Some(TeeTaper::Fillet), layer)?;
            let mut t1 = trench(&t, ow, 2., layer)?;
            t1.move_port("1", wire.port("1")?.midpoint)?;
            let mut t2 = trench(&t, ow, 2., layer)?;
            t2.move_port("2", wire.port("2")?.midpoint)?;

            let stub_step = trench(
                &optimal_step(&OptimalStep::new(wide, sw * 2.), layer)?,
                ow,
                3.,
                layer,
            )?;
            let arm_step = trench(
                &optimal_step(&OptimalStep::new(wide, sw), layer)?,
                ow,
                3.,
                layer,
            )?;
            let mut s1 = stub_step.clone();
            s1.rotate(90.);
            s1.move_port("2", t1.port("3")?.midpoint)?;
            let mut s2 = arm_step.clone();
            s2.move_port("2", t1.port("2")?.midpoint)?;
            let mut s3 = stub_step;
            s3.rotate(90.);
            s3.move_port("2", t2.port("3")?.midpoint)?;
            let mut s4 = arm_step;
            s4.rotate(180.);
            s4.move_port("2", t2.port("1")?.midpoint)?;

            let targets = [s2.port("1")?, s1.port("1")?, s3.port("1")?, s4.port("1")?];
            for (from, to) in taper_ends.iter().zip(targets.iter()) {
                let route = route_manhattan(from, to, layer)?;
                let opts = OutlineOpts {
                    rotate_ports: true,
                    ..OutlineOpts::new(ow, layer).open_ports(3.)
                };
                traces.push(outline(&route, &opts)?);
            }
            traces.extend([wire, t1, t2, s1, s2, s3, s4]);

            let mut e = Device::new("wire");
            for t in traces {
                e.add_ref(t);
            }
            e.flatten_to_layer(layer);
            let mut d = pads;
            d.name = "four_point".into();
            d.flatten();
            d.add_ref(e);
            d.move_bbox_to_origin()?;
            Ok(d)
        };
        let device = build().map_err(|e| a.context(e))?;
        let squares = sl / sw;
        info!("Squares {}", squares);
        let dev = TestDevice {
            device,
            kind: "four_point".into(),
            width: Some(sw),
            area: None,
            squares,
            params: Vec::new(),
        };
        sweep.push(params, i, dev, squares);
    }
    Ok(sweep)
}

/// Log the reset time of a detector of `squares` with sheet inductance `ls`
fn log_reset_time(squares: f64, ls: f64) -> f64 {
    debug!("Estimating reset time for {} squares", squares);
    reset_time_calc(&ResetTimeInput {
        squares: Some(squares),
        ls,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{EnumStr, SerializationFormat};

    fn origin_bbox(d: &Device) -> bool {
        d.bbox().p0 == Point::new(0, 0)
    }

    #[test]
    fn single_pad_detector() -> LayoutResult<()> {
        let sweep = snspd_pad_bilayer(&SnspdPadParams::default())?;
        assert_eq!(sweep.devices.len(), 1);
        assert_eq!(sweep.squares, vec![450.]);
        let dev = &sweep.devices[0];
        assert_eq!(dev.kind, "meander_snspd");
        assert_eq!((dev.width, dev.area, dev.squares), (Some(1.), Some(30.), 450.));
        assert_eq!(dev.device.insts.len(), 1);
        assert_eq!(
            dev.device.layers(),
            vec![LayerSpec::new(1, 0), LayerSpec::new(2, 0)]
        );
        assert!(origin_bbox(&dev.device));
        // The pad-to-ground chain runs vertically once rotated
        let bbox = dev.device.bbox();
        assert!(bbox.height() > bbox.width());
        Ok(())
    }
    #[test]
    fn swept_detectors() -> LayoutResult<()> {
        let params = SnspdPadParams {
            snspd_width: vec![0.5, 1.],
            snspd_area: vec![20., 30.],
            ..Default::default()
        };
        let sweep = snspd_pad_bilayer(&params)?;
        // (20 / 1) * (20 / 0.5), and (30 / 2) * (30 / 1)
        assert_eq!(sweep.squares, vec![800., 450.]);
        let first = &sweep.devices[0].params;
        assert_eq!(first[0], ("snspd_width".to_string(), 0.5));
        assert_eq!(first[1], ("snspd_area".to_string(), 20.));
        assert_eq!(first[2], (SQUARES_PARAM.to_string(), 800.));
        Ok(())
    }
    #[test]
    fn invalid_sweeps() {
        let params = SnspdPadParams {
            snspd_width: vec![0.5, 1.],
            ..Default::default()
        };
        match snspd_pad_bilayer(&params) {
            Err(LayoutError::Validation { stack, .. }) => {
                assert!(stack.contains(&ErrorContext::Param("snspd_area".into())));
                assert!(stack.contains(&ErrorContext::Family("snspd_pad_bilayer".into())));
            }
            other => panic!("expected a validation error, got {:?}", other.map(|_| ())),
        }
        let overfilled = SnspdPadParams {
            snspd_fill: 1.,
            ..Default::default()
        };
        match snspd_pad_bilayer(&overfilled) {
            Err(LayoutError::Validation { stack, .. }) => {
                assert_eq!(stack, vec![ErrorContext::Family("snspd_pad_bilayer[0]".into())]);
            }
            other => panic!("expected a validation error, got {:?}", other.map(|_| ())),
        }
    }
    #[test]
    fn two_pad_detector() -> LayoutResult<()> {
        let sweep = snspd_2pad_bilayer(&Snspd2PadParams::default())?;
        let dev = &sweep.devices[0];
        assert_eq!(dev.kind, "meander_snspd_diff");
        assert_eq!(dev.device.insts.len(), 2);
        assert!(origin_bbox(&dev.device));
        Ok(())
    }
    #[test]
    fn straight_inductors() -> LayoutResult<()> {
        let one = straight_snspd_pad_bilayer(&StraightSnspdPadParams::default())?;
        // 450 meander squares, and 50 / 0.1 more in the straight section
        assert_eq!(one.squares, vec![950.]);
        assert_eq!(one.devices[0].device.insts.len(), 1);
        assert!(origin_bbox(&one.devices[0].device));

        let two = straight_snspd_2pad_bilayer(&StraightSnspd2PadParams::default())?;
        assert_eq!(two.devices[0].kind, "straight_snspd_diff");
        assert_eq!(two.devices[0].device.insts.len(), 2);
        Ok(())
    }
    #[test]
    fn straight_wires() -> LayoutResult<()> {
        let params = StraightWireParams {
            straight_width: vec![0.1, 0.2],
            straight_length: vec![40., 40.],
            ..Default::default()
        };
        let sweep = straight_wire_pad_bilayer(&params)?;
        assert_eq!(sweep.squares.len(), 2);
        assert!((sweep.squares[0] - 400.).abs() < 1e-9);
        assert!((sweep.squares[1] - 200.).abs() < 1e-9);
        for dev in sweep.devices.iter() {
            assert_eq!(dev.kind, "straight_wire");
            assert_eq!(dev.area, None);
            assert!(origin_bbox(&dev.device));
        }
        Ok(())
    }
    #[test]
    fn resistors() -> LayoutResult<()> {
        let sweep = resistor_pad_bilayer(&ResistorParams::default())?;
        let dev = &sweep.devices[0];
        assert_eq!(dev.squares, 4.);
        assert_eq!(sweep.squares, vec![6.]);
        assert!(dev.device.insts.is_empty());
        assert_eq!(
            dev.device.layers(),
            vec![
                LayerSpec::new(1, 0),
                LayerSpec::new(2, 0),
                LayerSpec::new(3, 0)
            ]
        );
        assert!(origin_bbox(&dev.device));
        Ok(())
    }
    #[test]
    fn four_point_probes() -> LayoutResult<()> {
        let sweep = four_point_wire(&FourPointParams::default())?;
        let dev = &sweep.devices[0];
        assert_eq!(dev.kind, "four_point");
        assert_eq!(dev.squares, 200.);
        assert_eq!(dev.device.insts.len(), 1);
        assert_eq!(
            dev.device.layers(),
            vec![LayerSpec::new(1, 0), LayerSpec::new(2, 0)]
        );
        // Four pads in a row, spaced by 1.2 pad widths
        let bbox = dev.device.bbox();
        assert!(bbox.width() >= um(200. * 3.6 + 200.));
        Ok(())
    }
    #[test]
    fn family_selection() -> LayoutResult<()> {
        let params: FamilyParams = SerializationFormat::Yaml.from_str(
            "
            family: straight_wire_pad_bilayer
            straight_width: [0.1, 0.2]
            straight_length: [40, 80]
            ",
        )?;
        assert_eq!(params.family(), Family::StraightWire);
        assert_eq!(params.build()?.devices.len(), 2);

        for family in Family::all() {
            assert_eq!(family.defaults().family(), *family);
        }
        assert_eq!(Family::from_str("four_point_wire"), Some(Family::FourPoint));
        let unknown: Result<FamilyParams, _> =
            SerializationFormat::Yaml.from_str("family: spiral_wire");
        assert!(unknown.is_err());
        Ok(())
    }
}
