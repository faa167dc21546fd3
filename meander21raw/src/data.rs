//!
//! # Raw Layout Data Model
//!
//! Defines the primary structures for representation of device layout,
//! including [Library], [Device], [Instance], and related types.
//!
//! A [Device] holds geometric [Element]s, named [Port]s, and [Instance]s of other devices.
//! Instances share their definitions through [Arc]s: a definition referenced many times
//! is stored, and exported, once.
//!

// Std-Lib
use std::path::Path as FsPath;
use std::sync::Arc;

// Crates.io
use serde::{Deserialize, Serialize};

// Local Imports
use crate::{
    bbox::{BoundBox, BoundBoxTrait},
    error::{ErrorContext, LayoutError, LayoutResult},
    geom::{Int, Point, Polygon, Rect, Shape, ShapeTrait, Transform, TransformTrait},
    port::Port,
};

/// Distance Units Enumeration
/// Sets the size of one integer database unit in exported GDSII.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Units {
    /// Micrometers, or microns for we olde folke
    Micro,
    /// Nanometers
    Nano,
    /// Angstroms
    Angstrom,
}
impl Default for Units {
    /// Default units are nanometers, matching [crate::um]
    fn default() -> Units {
        Units::Nano
    }
}
impl Units {
    /// Size of one database unit, in meters
    pub fn meters(&self) -> f64 {
        match self {
            Units::Micro => 1e-6,
            Units::Nano => 1e-9,
            Units::Angstrom => 1e-10,
        }
    }
}

/// # Layer Specification
/// As in seemingly every layout system, this uses two numbers to identify each layer:
/// the layer number, and its datatype.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct LayerSpec(pub i16, pub i16);
impl LayerSpec {
    pub fn new(layer: i16, datatype: i16) -> Self {
        Self(layer, datatype)
    }
    /// Layer number
    pub fn layer(&self) -> i16 {
        self.0
    }
    /// Datatype number
    pub fn datatype(&self) -> i16 {
        self.1
    }
}
impl From<i16> for LayerSpec {
    /// Layer number `layer`, with the default datatype zero
    fn from(layer: i16) -> Self {
        Self(layer, 0)
    }
}
impl From<i32> for LayerSpec {
    /// Layer number `layer`, with the default datatype zero.
    /// Allows bare integer literals as layers. GDSII layer numbers fit in 16 bits.
    fn from(layer: i32) -> Self {
        Self(layer as i16, 0)
    }
}

/// # Primitive Geometric Element
///
/// Primary unit of [Device] geometry.
/// Combines a [Shape] with a [LayerSpec].
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Element {
    /// Layer
    pub layer: LayerSpec,
    /// Shape
    pub inner: Shape,
}
impl Element {
    pub fn new(layer: impl Into<LayerSpec>, inner: impl Into<Shape>) -> Self {
        Self {
            layer: layer.into(),
            inner: inner.into(),
        }
    }
}
impl TransformTrait for Element {
    fn transform(&self, trans: &Transform) -> Self {
        Self {
            layer: self.layer,
            inner: self.inner.transform(trans),
        }
    }
}

/// # Text Annotation
///
/// Free-floating text, used for device IDs and similar design notes.
/// Annotations do not describe connectivity.
///
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextElement {
    /// String Value
    pub string: String,
    /// Location
    pub loc: Point,
    /// Layer
    pub layer: LayerSpec,
}
impl TransformTrait for TextElement {
    fn transform(&self, trans: &Transform) -> Self {
        Self {
            string: self.string.clone(),
            loc: self.loc.transform(trans),
            layer: self.layer,
        }
    }
}

///
/// # Placement Trait
///
/// Movement operations shared by [Device]s and [Instance]s.
/// Implementers provide `apply` and `port`; everything else is built atop them.
/// Each movement returns `&mut Self`, for chaining.
///
pub trait Placement: BoundBoxTrait {
    /// Apply [Transform] `trans`
    fn apply(&mut self, trans: &Transform) -> &mut Self;
    /// Get port `name`, in our parent's coordinates
    fn port(&self, name: &str) -> LayoutResult<Port>;

    /// Translate by (`dx`, `dy`)
    fn move_by(&mut self, dx: Int, dy: Int) -> &mut Self {
        self.apply(&Transform::translate(dx as f64, dy as f64))
    }
    /// Translate by `dx` in the x-dimension
    fn movex(&mut self, dx: Int) -> &mut Self {
        self.move_by(dx, 0)
    }
    /// Translate by `dy` in the y-dimension
    fn movey(&mut self, dy: Int) -> &mut Self {
        self.move_by(0, dy)
    }
    /// Translate so that point `origin` lands on point `destination`
    fn move_to(&mut self, origin: Point, destination: Point) -> &mut Self {
        let d = destination.minus(&origin);
        self.move_by(d.x, d.y)
    }
    /// Translate so that the midpoint of port `name` lands on `destination`.
    /// Orientation is unchanged.
    fn move_port(&mut self, name: &str, destination: Point) -> LayoutResult<&mut Self> {
        let p = self.port(name)?;
        Ok(self.move_to(p.midpoint, destination))
    }
    /// Rotate by `angle` degrees, counter-clockwise about the origin
    fn rotate(&mut self, angle: f64) -> &mut Self {
        self.apply(&Transform::rotate(angle))
    }
    /// Rotate by `angle` degrees, counter-clockwise about `center`
    fn rotate_about(&mut self, angle: f64, center: &Point) -> &mut Self {
        self.apply(&Transform::rotate_about(angle, center))
    }
    /// Reflect across the line through `p1` and `p2`
    fn mirror(&mut self, p1: &Point, p2: &Point) -> &mut Self {
        self.apply(&Transform::mirror(p1, p2))
    }
    /// Translate so that our bounding box's lower-left corner lands on the origin.
    /// Fails for empty content.
    fn move_bbox_to_origin(&mut self) -> LayoutResult<&mut Self> {
        let bbox = self.bbox().non_empty("placement")?;
        Ok(self.move_to(bbox.p0, Point::new(0, 0)))
    }
    /// Rotate and translate so that port `port` faces port `destination`, with coincident midpoints.
    /// A non-zero `overlap` then pulls us back along `destination`'s orientation,
    /// so that the two overlap by that distance.
    fn connect(&mut self, port: &str, destination: &Port, overlap: Int) -> LayoutResult<&mut Self> {
        let p = self.port(port)?;
        let angle = 180. + destination.orientation - p.orientation;
        self.rotate_about(angle, &p.midpoint);
        let p = self.port(port)?;
        self.move_to(p.midpoint, destination.midpoint);
        if overlap != 0 {
            let (nx, ny) = destination.normal();
            let o = overlap as f64;
            self.apply(&Transform::translate(-o * nx, -o * ny));
        }
        Ok(self)
    }
}

/// # Instance of another Device
///
/// Placement is stored as location, reflection, and rotation,
/// applied to the referenced device in the order: reflect, rotate, translate.
///
#[derive(Debug, Clone)]
pub struct Instance {
    /// Instance Name
    pub inst_name: String,
    /// Device Definition Reference
    pub device: Arc<Device>,
    /// Location of `device` origin
    /// regardless of rotation or reflection
    pub loc: Point,
    /// Vertical reflection,
    /// applied *before* rotation
    pub reflect_vert: bool,
    /// Angle of rotation (degrees),
    /// Counter-clockwise and applied *after* reflection
    pub angle: f64,
}
impl Instance {
    /// Create a new [Instance] of `device`, at the identity placement
    pub fn new(inst_name: impl Into<String>, device: Arc<Device>) -> Self {
        Self {
            inst_name: inst_name.into(),
            device,
            loc: Point::default(),
            reflect_vert: false,
            angle: 0.,
        }
    }
    /// Our placement, as a [Transform]
    pub fn transform(&self) -> Transform {
        Transform::from_placement(&self.loc, self.reflect_vert, self.angle)
    }
    /// All of our device's ports, in our parent's coordinates
    pub fn ports(&self) -> Vec<Port> {
        let trans = self.transform();
        self.device.ports.iter().map(|p| p.transform(&trans)).collect()
    }
    /// Flattened geometry of our device, in our parent's coordinates
    pub fn flat_elements(&self) -> Vec<Element> {
        let mut elems = Vec::new();
        let mut annotations = Vec::new();
        flatten_helper(&self.device, &self.transform(), &mut elems, &mut annotations);
        elems
    }
}
impl Placement for Instance {
    /// Compose `trans` with our current placement
    fn apply(&mut self, trans: &Transform) -> &mut Self {
        let t = Transform::cascade(trans, &self.transform());
        self.loc = t.offset();
        self.reflect_vert = t.is_reflection();
        self.angle = t.angle();
        self
    }
    fn port(&self, name: &str) -> LayoutResult<Port> {
        let p = self
            .device
            .port(name)
            .map_err(|e| e.context(ErrorContext::Instance(self.inst_name.clone())))?;
        Ok(p.transform(&self.transform()))
    }
}
impl BoundBoxTrait for Instance {
    fn bbox(&self) -> BoundBox {
        let mut bbox = BoundBox::empty();
        for elem in self.flat_elements().iter() {
            bbox = elem.inner.union(&bbox);
        }
        bbox
    }
}

/// # Device
///
/// The primary unit of layout: geometric [Element]s, [Instance]s of other devices,
/// named [Port]s, and text annotations.
///
#[derive(Debug, Clone, Default)]
pub struct Device {
    /// Device Name
    pub name: String,
    /// Primitive/ Geometric Elements
    pub elems: Vec<Element>,
    /// Instances
    pub insts: Vec<Instance>,
    /// Ports, in insertion order, with unique names
    pub ports: Vec<Port>,
    /// Text Annotations
    pub annotations: Vec<TextElement>,
}
impl Device {
    /// Create a new and empty [Device] named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Add an [Element]
    pub fn add_element(&mut self, elem: Element) -> &mut Self {
        self.elems.push(elem);
        self
    }
    /// Add a [Shape] on `layer`
    pub fn add_shape(&mut self, shape: impl Into<Shape>, layer: impl Into<LayerSpec>) -> &mut Self {
        self.add_element(Element::new(layer, shape))
    }
    /// Add a polygon with vertices `pts` on `layer`
    pub fn add_polygon(&mut self, pts: Vec<Point>, layer: impl Into<LayerSpec>) -> &mut Self {
        self.add_shape(Polygon::new(pts), layer)
    }
    /// Add each of `polys` on `layer`
    pub fn add_polygons(&mut self, polys: Vec<Polygon>, layer: impl Into<LayerSpec>) -> &mut Self {
        let layer = layer.into();
        for poly in polys {
            self.add_shape(poly, layer);
        }
        self
    }
    /// Add a rectangle with corners `p0` and `p1` on `layer`
    pub fn add_rect(&mut self, p0: Point, p1: Point, layer: impl Into<LayerSpec>) -> &mut Self {
        self.add_shape(Rect::new(p0, p1), layer)
    }
    /// Add a text annotation
    pub fn add_label(
        &mut self,
        string: impl Into<String>,
        loc: Point,
        layer: impl Into<LayerSpec>,
    ) -> &mut Self {
        self.annotations.push(TextElement {
            string: string.into(),
            loc,
            layer: layer.into(),
        });
        self
    }
    /// Add a [Port]. Replaces any existing port of the same name.
    pub fn add_port(&mut self, port: Port) -> &mut Self {
        match self.ports.iter_mut().find(|p| p.name == port.name) {
            Some(existing) => *existing = port,
            None => self.ports.push(port),
        }
        self
    }
    /// Get port `name`
    pub fn port(&self, name: &str) -> LayoutResult<Port> {
        match self.ports.iter().find(|p| p.name == name) {
            Some(p) => Ok(p.clone()),
            None => Err(LayoutError::Validation {
                message: format!("No port named `{}`", name),
                stack: vec![ErrorContext::Device(self.name.clone())],
            }),
        }
    }
    /// Boolean indication of whether we have a port named `name`
    pub fn has_port(&self, name: &str) -> bool {
        self.ports.iter().any(|p| p.name == name)
    }
    /// Add an [Instance] of `device`, at the identity placement.
    /// Returns a mutable reference to it, for placement.
    pub fn add_ref(&mut self, device: impl Into<Arc<Device>>) -> &mut Instance {
        let device = device.into();
        let idx = self.insts.len();
        let inst_name = format!("{}_{}", device.name, idx);
        self.insts.push(Instance::new(inst_name, device));
        &mut self.insts[idx]
    }
    /// Add an [Instance] of `device` at location `loc`
    pub fn add_ref_at(&mut self, device: impl Into<Arc<Device>>, loc: Point) -> &mut Instance {
        let inst = self.add_ref(device);
        inst.loc = loc;
        inst
    }
    /// All geometry, including that of our instances, in our own coordinates
    pub fn flat_elements(&self) -> Vec<Element> {
        let mut elems = Vec::new();
        let mut annotations = Vec::new();
        flatten_helper(self, &Transform::identity(), &mut elems, &mut annotations);
        elems
    }
    /// Replace every [Instance] with its transformed geometry and annotations, recursively.
    /// Our own ports are unchanged; instance ports are dropped.
    pub fn flatten(&mut self) -> &mut Self {
        let mut elems = Vec::new();
        let mut annotations = Vec::new();
        flatten_helper(self, &Transform::identity(), &mut elems, &mut annotations);
        self.elems = elems;
        self.annotations = annotations;
        self.insts.clear();
        self
    }
    /// Flatten, and move every element onto `layer`
    pub fn flatten_to_layer(&mut self, layer: impl Into<LayerSpec>) -> &mut Self {
        let layer = layer.into();
        self.flatten();
        for elem in self.elems.iter_mut() {
            elem.layer = layer;
        }
        self
    }
    /// Polygons on `layer`, flattened
    pub fn polygons(&self, layer: LayerSpec) -> LayoutResult<Vec<Polygon>> {
        self.flat_elements()
            .iter()
            .filter(|e| e.layer == layer)
            .map(|e| e.inner.to_poly())
            .collect()
    }
    /// Polygons on all layers, flattened
    pub fn all_polygons(&self) -> LayoutResult<Vec<Polygon>> {
        self.flat_elements()
            .iter()
            .map(|e| e.inner.to_poly())
            .collect()
    }
    /// Sorted, de-duplicated list of the layers in use, including in instances
    pub fn layers(&self) -> Vec<LayerSpec> {
        let mut layers: Vec<LayerSpec> = self.flat_elements().iter().map(|e| e.layer).collect();
        layers.sort();
        layers.dedup();
        layers
    }
    /// Center of our bounding box. Fails for empty devices.
    pub fn center(&self) -> LayoutResult<Point> {
        let bbox = self.bbox().non_empty(&self.name)?;
        Ok(bbox.center())
    }
}
impl Placement for Device {
    /// Transform all geometry, instance placements, ports, and annotations
    fn apply(&mut self, trans: &Transform) -> &mut Self {
        for elem in self.elems.iter_mut() {
            *elem = elem.transform(trans);
        }
        for inst in self.insts.iter_mut() {
            inst.apply(trans);
        }
        for port in self.ports.iter_mut() {
            *port = port.transform(trans);
        }
        for text in self.annotations.iter_mut() {
            *text = text.transform(trans);
        }
        self
    }
    fn port(&self, name: &str) -> LayoutResult<Port> {
        Device::port(self, name)
    }
}
impl BoundBoxTrait for Device {
    fn bbox(&self) -> BoundBox {
        let mut bbox = BoundBox::empty();
        for elem in self.flat_elements().iter() {
            bbox = elem.inner.union(&bbox);
        }
        bbox
    }
}
/// Internal helper and core logic for flattening.
/// Pushes `device`'s geometry and annotations, transformed by `trans`, then recurses into its instances.
fn flatten_helper(
    device: &Device,
    trans: &Transform,
    elems: &mut Vec<Element>,
    annotations: &mut Vec<TextElement>,
) {
    elems.extend(device.elems.iter().map(|e| e.transform(trans)));
    annotations.extend(device.annotations.iter().map(|a| a.transform(trans)));
    for inst in device.insts.iter() {
        let trans = Transform::cascade(trans, &inst.transform());
        flatten_helper(&inst.device, &trans, elems, annotations);
    }
}

/// # Layout Library
/// A collection of top-level device definitions, for export.
#[derive(Debug, Clone, Default)]
pub struct Library {
    /// Library Name
    pub name: String,
    /// Distance Units
    pub units: Units,
    /// Device Definitions
    pub devices: Vec<Arc<Device>>,
}
impl Library {
    /// Create a new and empty Library
    pub fn new(name: impl Into<String>, units: Units) -> Self {
        Self {
            name: name.into(),
            units,
            ..Default::default()
        }
    }
    /// Add a top-level device. Returns the shared reference.
    pub fn add(&mut self, device: impl Into<Arc<Device>>) -> Arc<Device> {
        let device = device.into();
        self.devices.push(Arc::clone(&device));
        device
    }
    /// Convert to a GDSII Library
    pub fn to_gds(&self) -> LayoutResult<gds21::GdsLibrary> {
        crate::gds::GdsExporter::export(self)
    }
    /// Convert to GDSII and write to file `fname`
    pub fn save_gds(&self, fname: impl AsRef<FsPath>) -> LayoutResult<()> {
        let gds = self.to_gds()?;
        gds.save(&fname).map_err(|e| LayoutError::Export {
            message: format!("Failed writing {}: {:?}", fname.as_ref().display(), e),
            stack: vec![ErrorContext::Library(self.name.clone())],
        })
    }
}
