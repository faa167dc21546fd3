//!
//! # meander21raw unit tests
//!

use super::*;
use std::sync::Arc;

#[test]
fn point() {
    let p = Point::new(1, 2);
    assert_eq!(p.x, 1);
    assert_eq!(p.y, 2);
    assert_eq!(Point::um(1.5, -0.25), Point::new(1500, -250));
}

/// Create a horizontal wire of length 100 and width 10, with ports at both ends
fn wire() -> Device {
    let mut d = Device::new("wire");
    d.add_rect(Point::new(0, -5), Point::new(100, 5), 1);
    d.add_port(Port::new("1", Point::new(0, 0), 10, 180.));
    d.add_port(Port::new("2", Point::new(100, 0), 10, 0.));
    d
}

#[test]
fn ports_by_name() -> LayoutResult<()> {
    let mut d = wire();
    assert_eq!(d.port("2")?.midpoint, Point::new(100, 0));
    // Adding a same-named port replaces the original
    d.add_port(Port::new("2", Point::new(90, 0), 10, 0.));
    assert_eq!(d.ports.len(), 2);
    assert_eq!(d.port("2")?.midpoint, Point::new(90, 0));
    assert!(d.has_port("1"));
    assert!(!d.has_port("3"));
    match d.port("3") {
        Err(LayoutError::Validation { stack, .. }) => {
            assert_eq!(stack, vec![ErrorContext::Device("wire".into())])
        }
        _ => panic!("expected a validation error"),
    }
    Ok(())
}

#[test]
fn connect_ports() -> LayoutResult<()> {
    let dest = Port::new("dest", Point::new(500, 200), 10, 90.);
    let mut top = Device::new("top");
    let inst = top.add_ref(wire());
    inst.connect("1", &dest, 0)?;
    let p = inst.port("1")?;
    assert_eq!(p.midpoint, Point::new(500, 200));
    assert_eq!(p.orientation, 270.);
    assert_eq!(inst.angle, 90.);
    assert!(!inst.reflect_vert);
    assert_eq!(
        inst.bbox(),
        BoundBox::from_points(Point::new(495, 200), Point::new(505, 300))
    );
    // The far end faces away from the destination
    assert_eq!(inst.port("2")?.orientation, 90.);
    assert_eq!(inst.port("2")?.midpoint, Point::new(500, 300));

    // Overlap pulls the instance back across the destination edge
    let inst = top.add_ref(wire());
    inst.connect("1", &dest, 10)?;
    assert_eq!(inst.port("1")?.midpoint, Point::new(500, 190));
    Ok(())
}

#[test]
fn connect_devices() -> LayoutResult<()> {
    // Chain two wires end to end, as devices rather than instances
    let a = wire();
    let mut b = wire();
    b.rotate(37.);
    b.connect("1", &a.port("2")?, 0)?;
    assert_eq!(b.port("1")?.midpoint, Point::new(100, 0));
    assert_eq!(b.port("1")?.orientation, 180.);
    assert_eq!(b.port("2")?.midpoint, Point::new(200, 0));
    assert_eq!(
        b.bbox(),
        BoundBox::from_points(Point::new(100, -5), Point::new(200, 5))
    );
    Ok(())
}

#[test]
fn instance_placement_composes() {
    let mut top = Device::new("top");
    let inst = top.add_ref(wire());
    inst.rotate(90.).rotate(90.);
    assert_eq!(inst.angle, 180.);
    assert_eq!(inst.port("2").unwrap().midpoint, Point::new(-100, 0));
    // Mirror across the x-axis: reflected, and the rotation flips sign
    inst.mirror(&Point::new(0, 0), &Point::new(1, 0));
    assert!(inst.reflect_vert);
    assert_eq!(inst.angle, 180.);
    inst.move_by(10, 20);
    assert_eq!(inst.loc, Point::new(10, 20));
    // Geometry always agrees with the composed placement
    let flat = inst.flat_elements();
    assert_eq!(
        flat[0].inner.bbox(),
        BoundBox::from_points(Point::new(-90, 15), Point::new(10, 25))
    );
    assert_eq!(inst.port("2").unwrap().midpoint, Point::new(-90, 20));
    assert_eq!(inst.port("2").unwrap().orientation, 180.);
}

#[test]
fn flatten_nested() -> LayoutResult<()> {
    let wire = Arc::new(wire());
    let mut mid = Device::new("mid");
    mid.add_ref(Arc::clone(&wire));
    mid.add_ref(Arc::clone(&wire)).movey(100);
    let mid = Arc::new(mid);

    let mut top = Device::new("top");
    top.add_rect(Point::new(0, 0), Point::new(1, 1), 2);
    top.add_ref(Arc::clone(&mid)).rotate(90.);
    top.add_ref_at(Arc::clone(&mid), Point::new(1000, 0));
    top.add_label("A0", Point::new(0, 0), 5);
    let bbox = top.bbox();
    assert_eq!(top.flat_elements().len(), 5);

    let mut flat = top.clone();
    flat.flatten();
    assert!(flat.insts.is_empty());
    assert_eq!(flat.elems.len(), 5);
    assert_eq!(flat.bbox(), bbox);
    assert_eq!(flat.annotations.len(), 1);
    assert_eq!(flat.layers(), vec![LayerSpec::new(1, 0), LayerSpec::new(2, 0)]);

    flat.flatten_to_layer(LayerSpec::new(7, 0));
    assert_eq!(flat.layers(), vec![LayerSpec::new(7, 0)]);
    assert_eq!(flat.polygons(LayerSpec::new(7, 0))?.len(), 5);
    assert!(flat.polygons(LayerSpec::new(1, 0))?.is_empty());
    Ok(())
}

#[test]
fn move_and_align() -> LayoutResult<()> {
    let mut d = wire();
    d.move_port("2", Point::new(0, 0))?;
    assert_eq!(d.port("1")?.midpoint, Point::new(-100, 0));
    d.move_bbox_to_origin()?;
    assert_eq!(
        d.bbox(),
        BoundBox::from_points(Point::new(0, 0), Point::new(100, 10))
    );
    assert_eq!(d.center()?, Point::new(50, 5));
    d.rotate_about(180., &Point::new(50, 5));
    assert_eq!(d.port("1")?.midpoint, Point::new(100, 5));
    assert_eq!(d.port("1")?.orientation, 0.);

    let mut empty = Device::new("empty");
    assert!(empty.move_bbox_to_origin().is_err());
    assert!(empty.center().is_err());
    assert!(empty.move_port("1", Point::new(0, 0)).is_err());
    Ok(())
}

#[test]
fn library_shares_definitions() {
    let mut lib = Library::new("lib", Units::default());
    let a = lib.add(wire());
    let b = lib.add(Arc::clone(&a));
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(lib.devices.len(), 2);
    assert_eq!(lib.units, Units::Nano);
    assert_eq!(lib.units.meters(), 1e-9);
}
