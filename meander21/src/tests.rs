//!
//! # meander21 integration tests
//!

use crate::doc::{device_doc, pack_library, pack_sweeps, PackOpts};
use crate::families::{snspd_pad_bilayer, Family, Sweep};
use crate::params::SnspdPadParams;
use crate::raw::{gds21, LayoutError, LayoutResult, MAX_POINTS};
use crate::utils::EnumStr;

/// Default sweeps of every family, in declaration order
fn all_sweeps() -> LayoutResult<Vec<Sweep>> {
    Family::all().iter().map(|f| f.defaults().build()).collect()
}

#[test]
fn every_family_to_gds() -> LayoutResult<()> {
    let opts = PackOpts::default();
    let packs = pack_sweeps(all_sweeps()?, &opts)?;
    assert_eq!(packs.len(), 7);
    assert_eq!(packs[6].letter, 'G');

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("families.gds");
    let lib = pack_library("families", &packs, &opts)?;
    lib.save_gds(&path)?;

    let gds = gds21::GdsLibrary::load(&path).map_err(|e| LayoutError::msg(format!("{:?}", e)))?;
    assert_eq!(gds.name, "families");
    let names: Vec<&str> = gds.structs.iter().map(|s| s.name.as_str()).collect();
    for name in ["families", "pack_A", "pack_G", "A0", "B0", "G0"] {
        assert!(names.contains(&name), "missing struct {}", name);
    }
    // Each padded detector carries its own pad definitions, uniquified on export
    assert!(names.contains(&"pad_u") && names.contains(&"pad_u_1"));
    // The top-level device is written last
    assert_eq!(names.last(), Some(&"families"));
    Ok(())
}

#[test]
fn every_family_documented() -> LayoutResult<()> {
    let packs = pack_sweeps(all_sweeps()?, &PackOpts::default())?;
    let doc = device_doc(&packs)?;
    for family_type in [
        "meander_snspd",
        "meander_snspd_diff",
        "straight_snspd",
        "straight_snspd_diff",
        "straight_wire",
        "resistor",
        "four_point",
    ] {
        assert!(doc.contains(family_type), "missing type {}", family_type);
    }
    // One frame above and below each pack
    assert_eq!(doc.matches("\\ \n").count(), 14);
    assert!(doc.contains("r_length"));
    Ok(())
}

#[test]
fn large_detector_to_gds() -> LayoutResult<()> {
    // Thousands of turns, outlined into trenches far longer than a single boundary allows
    let params = SnspdPadParams {
        snspd_width: vec![0.1],
        snspd_area: vec![120.],
        ..Default::default()
    };
    let opts = PackOpts::default();
    let packs = pack_sweeps(vec![snspd_pad_bilayer(&params)?], &opts)?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("large.gds");
    pack_library("large", &packs, &opts)?.save_gds(&path)?;

    let gds = gds21::GdsLibrary::load(&path).map_err(|e| LayoutError::msg(format!("{:?}", e)))?;
    let mut boundaries = 0;
    for strukt in gds.structs.iter() {
        for elem in strukt.elems.iter() {
            if let gds21::GdsElement::GdsBoundary(b) = elem {
                // Closed boundaries repeat their first point
                assert!(b.xy.len() <= MAX_POINTS + 1, "{} points", b.xy.len());
                boundaries += 1;
            }
        }
    }
    assert!(boundaries > 10);
    Ok(())
}

#[test]
fn too_many_packs() {
    let sweeps = vec![Sweep::default(); 27];
    assert!(pack_sweeps(sweeps, &PackOpts::default()).is_err());
}
