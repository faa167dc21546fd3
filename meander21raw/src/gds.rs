//!
//! # GDSII Export Module
//!

// Std-Lib
use std::collections::{HashMap, HashSet};
use std::convert::TryFrom;
use std::sync::Arc;

// Crates.io
use by_address::ByAddress;
use tracing::debug;

// Local imports
use crate::{
    data::{Device, Element, Instance, Library, TextElement},
    error::{ErrorContext, LayoutError, LayoutResult},
    geom::{Point, ShapeTrait},
    utils::{DepOrder, DepOrderer, ErrorHelper, Unwrapper},
};

/// # Device Reference
/// Shared pointer to a [Device], hashed and compared by address.
/// Two definitions with identical content but separate allocations are distinct.
pub type DeviceRef = ByAddress<Arc<Device>>;

/// Dependency-orders device definitions, instantiated devices first
struct DeviceOrder;
impl DepOrder for DeviceOrder {
    type Item = DeviceRef;
    type Error = LayoutError;
    fn process(item: &DeviceRef, orderer: &mut DepOrderer<Self>) -> LayoutResult<()> {
        for inst in item.0.insts.iter() {
            orderer.push(&ByAddress(Arc::clone(&inst.device)))?;
        }
        Ok(())
    }
    fn cycle(item: &DeviceRef) -> LayoutError {
        LayoutError::Export {
            message: format!("Device `{}` instantiates itself", item.0.name),
            stack: Vec::new(),
        }
    }
}

/// # Gds21 Exporter
/// Converts a [Library] to a GDSII library ([gds21::GdsLibrary]).
///
/// Each distinct device definition becomes one [gds21::GdsStruct], written after every
/// definition it instantiates. Definitions sharing a name are uniquified with a numeric suffix.
#[derive(Debug)]
pub struct GdsExporter<'lib> {
    lib: &'lib Library,
    /// Exported struct-name per definition
    names: HashMap<DeviceRef, String>,
    ctx: Vec<ErrorContext>,
}
impl<'lib> GdsExporter<'lib> {
    pub fn export(lib: &'lib Library) -> LayoutResult<gds21::GdsLibrary> {
        Self {
            lib,
            names: HashMap::new(),
            ctx: vec![ErrorContext::Library(lib.name.clone())],
        }
        .export_lib()
    }
    fn export_lib(&mut self) -> LayoutResult<gds21::GdsLibrary> {
        let tops: Vec<DeviceRef> = self
            .lib
            .devices
            .iter()
            .map(|d| ByAddress(Arc::clone(d)))
            .collect();
        let order = DeviceOrder::order(&tops)?;
        // Assign unique struct names, in dependency order
        let mut used = HashSet::new();
        for dev in order.iter() {
            let name = unique_name(&dev.0.name, &mut used);
            self.names.insert(dev.clone(), name);
        }
        debug!("Exporting {} structs to GDS", order.len());

        let mut lib = gds21::GdsLibrary::new(&self.lib.name);
        // User units are always microns
        let meters = self.lib.units.meters();
        lib.units = gds21::GdsUnits::new(meters / 1e-6, meters);
        for dev in order.iter() {
            let s = self.export_device(dev)?;
            lib.structs.push(s);
        }
        Ok(lib)
    }
    /// Convert a [Device] to a [gds21::GdsStruct] definition
    fn export_device(&mut self, dev: &DeviceRef) -> LayoutResult<gds21::GdsStruct> {
        let device = &dev.0;
        self.ctx.push(ErrorContext::Device(device.name.clone()));
        let name = self.struct_name(dev)?;
        let mut elems = Vec::with_capacity(device.insts.len() + device.elems.len());
        for inst in device.insts.iter() {
            elems.push(self.export_instance(inst)?.into());
        }
        for elem in device.elems.iter() {
            elems.push(self.export_element(elem)?.into());
        }
        for text in device.annotations.iter() {
            elems.push(self.export_text(text)?.into());
        }
        let mut s = gds21::GdsStruct::new(name);
        s.elems = elems;
        self.ctx.pop();
        Ok(s)
    }
    /// Get the exported struct name for `dev`
    fn struct_name(&self, dev: &DeviceRef) -> LayoutResult<String> {
        let name = self
            .names
            .get(dev)
            .unwrapper(self, format!("Device `{}` not ordered for export", dev.0.name))?;
        Ok(name.clone())
    }
    /// Convert an [Instance] to a GDS instance, AKA [gds21::GdsStructRef]
    fn export_instance(&mut self, inst: &Instance) -> LayoutResult<gds21::GdsStructRef> {
        self.ctx.push(ErrorContext::Instance(inst.inst_name.clone()));
        let name = self.struct_name(&ByAddress(Arc::clone(&inst.device)))?;
        let strans = if inst.reflect_vert || inst.angle != 0. {
            Some(gds21::GdsStrans {
                reflected: inst.reflect_vert,
                angle: if inst.angle != 0. {
                    Some(inst.angle)
                } else {
                    None
                },
                ..Default::default()
            })
        } else {
            None
        };
        let sref = gds21::GdsStructRef {
            name,
            xy: self.export_point(&inst.loc)?,
            strans,
            ..Default::default()
        };
        self.ctx.pop();
        Ok(sref)
    }
    /// Convert an [Element] into a closed [gds21::GdsBoundary].
    /// GDS boundaries repeat their origin for closure,
    /// so an N-sided polygon is described by N+1 points.
    fn export_element(&self, elem: &Element) -> LayoutResult<gds21::GdsBoundary> {
        let poly = match elem.inner.to_poly() {
            Ok(p) => p,
            Err(e) => return self.fail(format!("Cannot export shape: {}", e)),
        };
        self.assert(poly.points.len() >= 3, "Polygon with fewer than three points")?;
        let mut xy = Vec::with_capacity(poly.points.len() + 1);
        for p in poly.points.iter() {
            xy.push(self.export_point(p)?);
        }
        xy.push(xy[0].clone());
        Ok(gds21::GdsBoundary {
            layer: elem.layer.layer(),
            datatype: elem.layer.datatype(),
            xy,
            ..Default::default()
        })
    }
    /// Convert a [TextElement] to a [gds21::GdsTextElem]
    fn export_text(&self, text: &TextElement) -> LayoutResult<gds21::GdsTextElem> {
        Ok(gds21::GdsTextElem {
            string: text.string.clone(),
            layer: text.layer.layer(),
            texttype: text.layer.datatype(),
            xy: self.export_point(&text.loc)?,
            ..Default::default()
        })
    }
    /// Convert a [Point] to 32-bit GDS coordinates, failing if out of range
    fn export_point(&self, pt: &Point) -> LayoutResult<gds21::GdsPoint> {
        let x = i32::try_from(pt.x).unwrapper(self, format!("Coordinate {} out of range", pt.x))?;
        let y = i32::try_from(pt.y).unwrapper(self, format!("Coordinate {} out of range", pt.y))?;
        Ok(gds21::GdsPoint::new(x, y))
    }
}
impl ErrorHelper for GdsExporter<'_> {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Export {
            message: msg.into(),
            stack: self.ctx.clone(),
        }
    }
}

/// Return `name`, or the first of `name_1`, `name_2`, ... not yet in `used`.
/// Marks the returned name as used.
fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = name.to_string();
    let mut k = 1;
    while used.contains(&candidate) {
        candidate = format!("{}_{}", name, k);
        k += 1;
    }
    used.insert(candidate.clone());
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{LayerSpec, Placement, Units};
    use crate::geom::Path;

    fn pad() -> Device {
        let mut d = Device::new("pad");
        d.add_rect(Point::new(0, 0), Point::new(100, 50), 2);
        d
    }

    #[test]
    fn unique_names() {
        let mut used = HashSet::new();
        assert_eq!(unique_name("a", &mut used), "a");
        assert_eq!(unique_name("a", &mut used), "a_1");
        assert_eq!(unique_name("a", &mut used), "a_2");
        assert_eq!(unique_name("a_1", &mut used), "a_1_1");
    }
    #[test]
    fn shared_definitions_export_once() -> LayoutResult<()> {
        let pad = Arc::new(pad());
        let mut top = Device::new("top");
        top.add_ref(Arc::clone(&pad)).movex(500);
        top.add_ref(Arc::clone(&pad)).rotate(90.);
        // A distinct definition with the same name
        top.add_ref(pad_clone_named("pad"));
        let mut lib = Library::new("lib", Units::Nano);
        lib.add(top);
        let gds = lib.to_gds()?;
        let names: Vec<&str> = gds.structs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["pad", "pad_1", "top"]);
        assert_eq!(gds.units, gds21::GdsUnits::new(1e-3, 1e-9));
        let top = &gds.structs[2];
        assert_eq!(top.elems.len(), 3);
        match &top.elems[1] {
            gds21::GdsElement::GdsStructRef(r) => {
                assert_eq!(r.name, "pad");
                assert_eq!(r.strans.as_ref().and_then(|s| s.angle), Some(90.));
            }
            other => panic!("expected a struct reference, got {:?}", other),
        }
        Ok(())
    }
    #[test]
    fn device_refs_compare_by_address() {
        let a: DeviceRef = ByAddress(Arc::new(pad()));
        let b: DeviceRef = ByAddress(Arc::new(pad()));
        assert!(a == a.clone());
        assert!(a != b);
        let mut names = HashMap::new();
        names.insert(a.clone(), "pad");
        names.insert(b, "pad_1");
        assert_eq!(names.len(), 2);
        assert_eq!(names.get(&a), Some(&"pad"));
    }
    fn pad_clone_named(name: &str) -> Device {
        let mut d = pad();
        d.name = name.into();
        d
    }
    #[test]
    fn boundaries_are_closed() -> LayoutResult<()> {
        let mut d = pad();
        d.add_shape(
            Path::new(vec![Point::new(0, 0), Point::new(0, 100)], 10),
            LayerSpec::new(3, 1),
        );
        d.add_label("A0", Point::new(5, 5), LayerSpec::new(2, 0));
        let mut lib = Library::new("lib", Units::Nano);
        lib.add(d);
        let gds = lib.to_gds()?;
        let elems = &gds.structs[0].elems;
        assert_eq!(elems.len(), 3);
        for elem in elems[0..2].iter() {
            match elem {
                gds21::GdsElement::GdsBoundary(b) => {
                    assert_eq!(b.xy.len(), 5);
                    assert_eq!(b.xy[0], b.xy[4]);
                }
                other => panic!("expected a boundary, got {:?}", other),
            }
        }
        match &elems[1] {
            gds21::GdsElement::GdsBoundary(b) => assert_eq!((b.layer, b.datatype), (3, 1)),
            _ => panic!("expected a boundary"),
        }
        match &elems[2] {
            gds21::GdsElement::GdsTextElem(t) => assert_eq!(t.string, "A0"),
            other => panic!("expected text, got {:?}", other),
        }
        Ok(())
    }
    #[test]
    fn out_of_range_fails() {
        let mut d = Device::new("huge");
        d.add_rect(Point::new(0, 0), Point::new(1 << 40, 10), 1);
        let mut lib = Library::new("lib", Units::Nano);
        lib.add(d);
        assert!(lib.to_gds().is_err());
    }
    #[test]
    fn save_and_read_back() -> LayoutResult<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("pad.gds");
        let mut lib = Library::new("padlib", Units::Nano);
        lib.add(pad());
        lib.save_gds(&path)?;
        let gds = gds21::GdsLibrary::load(&path).map_err(|e| LayoutError::msg(format!("{:?}", e)))?;
        assert_eq!(gds.name, "padlib");
        assert_eq!(gds.structs.len(), 1);
        assert_eq!(gds.structs[0].name, "pad");
        Ok(())
    }
}
