//!
//! # Device Packs and Documents
//!
//! Sweeps are laid out in labeled rows ([DevicePack]s), one letter per row and one index per device.
//! The device document lists each ID alongside its type and swept parameters, for use at the probe station.
//!

// Std-Lib
use std::path::{Path, PathBuf};
use std::sync::Arc;

// Crates.io
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// Local imports
use crate::families::{Sweep, TestDevice};
use crate::raw::{
    um, BoundBoxTrait, Device, LayerSpec, LayoutError, LayoutResult, Library, Placement, Point,
    Units,
};
use crate::utils::ErrorContext;

/// Column width of device documents
const TXT_SPACING: usize = 20;

/// # Packing Options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackOpts {
    /// Gap between neighboring devices, and between rows, in micrometers
    pub spacing: f64,
    /// Layer of the ID labels
    pub label_layer: LayerSpec,
}
impl Default for PackOpts {
    fn default() -> Self {
        Self {
            spacing: 100.,
            label_layer: LayerSpec::new(2, 0),
        }
    }
}

///
/// # Device Pack
///
/// A row of [TestDevice]s, each renamed to its ID `<letter><index>`
/// and labeled with it just below its lower-left corner.
///
#[derive(Debug, Clone)]
pub struct DevicePack {
    pub letter: char,
    /// The packed row, with one instance per device
    pub device: Device,
    /// Packed devices, in ID order
    pub devices: Vec<TestDevice>,
}
impl DevicePack {
    /// Pack `sweep` into row `letter`. Fails for empty sweeps.
    pub fn new(letter: char, sweep: Sweep, opts: &PackOpts) -> LayoutResult<Self> {
        if sweep.devices.is_empty() {
            return Err(LayoutError::Validation {
                message: "Cannot pack an empty sweep".into(),
                stack: vec![ErrorContext::Device(format!("pack_{}", letter))],
            });
        }
        let gap = um(opts.spacing);
        let mut row = Device::new(format!("pack_{}", letter));
        let mut devices = Vec::with_capacity(sweep.devices.len());
        let mut x = 0;
        for (idx, mut dev) in sweep.devices.into_iter().enumerate() {
            let id = format!("{}{}", letter, idx);
            dev.device.name = id.clone();
            let bbox = dev.device.bbox().non_empty(&id)?;
            row.add_ref(Arc::new(dev.device.clone()))
                .move_to(bbox.p0, Point::new(x, 0));
            row.add_label(id, Point::new(x, -gap / 2), opts.label_layer);
            x += bbox.width() + gap;
            devices.push(dev);
        }
        debug!("Packed {} devices into row {}", devices.len(), letter);
        Ok(Self {
            letter,
            device: row,
            devices,
        })
    }
    /// ID of our device at `idx`
    pub fn id(&self, idx: usize) -> String {
        format!("{}{}", self.letter, idx)
    }
}

/// Pack each of `sweeps` into its own row, lettered from `A`
pub fn pack_sweeps(sweeps: Vec<Sweep>, opts: &PackOpts) -> LayoutResult<Vec<DevicePack>> {
    if sweeps.len() > 26 {
        return LayoutError::invalid(format!(
            "Cannot letter {} packs, at most 26 are supported",
            sweeps.len()
        ));
    }
    sweeps
        .into_iter()
        .zip('A'..='Z')
        .map(|(sweep, letter)| DevicePack::new(letter, sweep, opts))
        .collect()
}

/// Stack `packs` top to bottom into a single device named `name`
pub fn stack_packs(name: &str, packs: &[DevicePack], opts: &PackOpts) -> LayoutResult<Device> {
    let gap = um(opts.spacing);
    let mut top = Device::new(name);
    let mut y = 0;
    for pack in packs.iter() {
        let bbox = pack.device.bbox().non_empty(&pack.device.name)?;
        top.add_ref(Arc::new(pack.device.clone()))
            .move_to(Point::new(bbox.p0.x, bbox.p1.y), Point::new(0, y));
        y -= bbox.height() + gap;
    }
    Ok(top)
}

/// [Library] named `name` with `packs` stacked into its single top-level device
pub fn pack_library(name: &str, packs: &[DevicePack], opts: &PackOpts) -> LayoutResult<Library> {
    let mut lib = Library::new(name, Units::Nano);
    lib.add(stack_packs(name, packs, opts)?);
    Ok(lib)
}

/// Format `val` rounded to four decimal places, always with a fractional part
fn decimal(val: f64) -> String {
    let r = (val * 1e4).round() / 1e4;
    if r.fract() == 0. && r.abs() < 1e16 {
        format!("{:.1}", r)
    } else {
        format!("{}", r)
    }
}

/// Pad `s` with trailing spaces to [TXT_SPACING]
fn cell(s: &str) -> String {
    format!("{:<width$}", s, width = TXT_SPACING)
}

/// Tab-join `cells`, as each row and header is written
fn join(cells: &[String]) -> String {
    cells.join("\t")
}

///
/// # Device Document
///
/// One framed table per pack. Each has columns for the device ID, its type,
/// and each of its swept parameters, with dotted separators between rows.
///
pub fn device_doc(packs: &[DevicePack]) -> LayoutResult<String> {
    let mut doc = String::new();
    for pack in packs.iter() {
        let first = match pack.devices.first() {
            Some(d) => d,
            None => {
                return Err(LayoutError::Validation {
                    message: "Cannot document an empty pack".into(),
                    stack: vec![ErrorContext::Device(pack.device.name.clone())],
                })
            }
        };
        let mut headers = vec![cell("ID"), cell("TYPE")];
        headers.extend(first.params.iter().map(|(key, _)| cell(key)));
        headers.push("\n".into());

        let mut rows = String::new();
        let mut width = 0;
        for (idx, dev) in pack.devices.iter().enumerate() {
            let mut line = vec![cell(&pack.id(idx)), cell(&dev.kind)];
            line.extend(dev.params.iter().map(|(_, val)| cell(&decimal(*val))));
            line.push("\n".into());
            let line = join(&line);
            width = line.chars().count();
            rows.push_str(&".".repeat(width));
            rows.push_str(" \n");
            rows.push_str(&line);
        }
        let frame = format!("\\{}\\ \n", "-".repeat(width));
        doc.push_str(&frame);
        doc.push_str(&join(&headers));
        doc.push_str(&rows);
        doc.push_str(&frame);
    }
    Ok(doc)
}

/// Write the [device_doc] of `packs` to `<dir>/<sample>/<sample>_device_doc.txt`,
/// creating directories as needed. Returns the file path.
pub fn write_device_doc(
    packs: &[DevicePack],
    dir: impl AsRef<Path>,
    sample: &str,
) -> LayoutResult<PathBuf> {
    if sample.trim().is_empty() {
        return LayoutError::invalid("Device document requires a sample name");
    }
    let doc = device_doc(packs)?;
    let folder = dir.as_ref().join(sample);
    std::fs::create_dir_all(&folder)?;
    let path = folder.join(format!("{}_device_doc.txt", sample));
    std::fs::write(&path, doc)?;
    info!("Wrote device document {}", path.display());
    Ok(path)
}
