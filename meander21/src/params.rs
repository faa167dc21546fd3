//!
//! # Device-Family Parameters
//!
//! One parameter struct per device family, deserializable from JSON, YAML, or TOML.
//! Missing fields take their defaults.
//!
//! Vector-valued fields are *sweeps*: the family generates one device per entry,
//! so every sweep of a family must share a single, non-zero length.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local imports
use crate::raw::{LayoutError, LayoutResult};
use crate::utils::ErrorContext;

///
/// # Swept Parameters
///
/// Implemented by each family's parameter struct, listing its vector-valued fields.
///
pub trait Sweeps {
    /// Named sweep vectors, in declaration order
    fn sweeps(&self) -> Vec<(&'static str, &[f64])>;

    /// The common length of all sweeps.
    /// Fails, naming the field, if any sweep is empty or differs in length from the first.
    fn sweep_len(&self) -> LayoutResult<usize> {
        let sweeps = self.sweeps();
        let len = sweeps.first().map(|(_, v)| v.len()).unwrap_or(0);
        for (name, values) in sweeps.iter() {
            if values.is_empty() || values.len() != len {
                return Err(LayoutError::Validation {
                    message: format!(
                        "Sweep `{}` has {} entries, expected {}",
                        name,
                        values.len(),
                        len.max(1)
                    ),
                    stack: vec![ErrorContext::Param(name.to_string())],
                });
            }
        }
        if len == 0 {
            return LayoutError::invalid("No swept parameters");
        }
        Ok(len)
    }
}

/// # Meander Detector with One Pad
/// Parameters of [crate::families::snspd_pad_bilayer]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SnspdPadParams {
    pub pad_width: f64,
    /// Trench width around the pad
    pub pad_outline: f64,
    pub pad_taper_length: f64,
    pub snspd_outline: f64,
    pub snspd_width: Vec<f64>,
    /// Fraction of the meander area covered by wire
    pub snspd_fill: f64,
    pub snspd_area: Vec<f64>,
    pub ground_taper_length: f64,
    pub ground_taper_width: f64,
    pub snspd_layer: i16,
    pub pad_layer: i16,
    /// Sheet inductance, pH per square
    pub sheet_inductance: f64,
}
impl Default for SnspdPadParams {
    fn default() -> Self {
        Self {
            pad_width: 200.,
            pad_outline: 7.,
            pad_taper_length: 40.,
            snspd_outline: 0.2,
            snspd_width: vec![1.],
            snspd_fill: 0.5,
            snspd_area: vec![30.],
            ground_taper_length: 10.,
            ground_taper_width: 50.,
            snspd_layer: 1,
            pad_layer: 2,
            sheet_inductance: 300.,
        }
    }
}
impl Sweeps for SnspdPadParams {
    fn sweeps(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("snspd_width", &self.snspd_width),
            ("snspd_area", &self.snspd_area),
        ]
    }
}

/// # Meander Detector between Two Pads
/// Parameters of [crate::families::snspd_2pad_bilayer]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Snspd2PadParams {
    pub pad_width: f64,
    pub pad_outline: f64,
    pub pad_taper_length: f64,
    pub snspd_outline: f64,
    pub snspd_width: Vec<f64>,
    pub snspd_fill: f64,
    pub snspd_area: Vec<f64>,
    pub snspd_layer: i16,
    pub pad_layer: i16,
    pub sheet_inductance: f64,
}
impl Default for Snspd2PadParams {
    fn default() -> Self {
        Self {
            pad_width: 200.,
            pad_outline: 7.,
            pad_taper_length: 60.,
            snspd_outline: 0.2,
            snspd_width: vec![1.],
            snspd_fill: 0.5,
            snspd_area: vec![30.],
            snspd_layer: 1,
            pad_layer: 2,
            sheet_inductance: 80.,
        }
    }
}
impl Sweeps for Snspd2PadParams {
    fn sweeps(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("snspd_width", &self.snspd_width),
            ("snspd_area", &self.snspd_area),
        ]
    }
}

/// # Meander Detector in Series with a Straight Inductor, One Pad
/// Parameters of [crate::families::straight_snspd_pad_bilayer]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StraightSnspdPadParams {
    pub pad_width: f64,
    pub pad_outline: f64,
    pub pad_taper_length: f64,
    pub snspd_outline: f64,
    pub snspd_width: Vec<f64>,
    pub snspd_fill: f64,
    pub snspd_area: Vec<f64>,
    pub ground_taper_length: f64,
    pub ground_taper_width: f64,
    pub straight_width: Vec<f64>,
    pub straight_length: Vec<f64>,
    pub snspd_layer: i16,
    pub pad_layer: i16,
    pub sheet_inductance: f64,
}
impl Default for StraightSnspdPadParams {
    fn default() -> Self {
        Self {
            pad_width: 200.,
            pad_outline: 7.,
            pad_taper_length: 40.,
            snspd_outline: 0.2,
            snspd_width: vec![1.],
            snspd_fill: 0.5,
            snspd_area: vec![30.],
            ground_taper_length: 40.,
            ground_taper_width: 150.,
            straight_width: vec![0.1],
            straight_length: vec![50.],
            snspd_layer: 1,
            pad_layer: 2,
            sheet_inductance: 300.,
        }
    }
}
impl Sweeps for StraightSnspdPadParams {
    fn sweeps(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("snspd_width", &self.snspd_width),
            ("snspd_area", &self.snspd_area),
            ("straight_width", &self.straight_width),
            ("straight_length", &self.straight_length),
        ]
    }
}

/// # Meander Detector in Series with a Straight Inductor, Two Pads
/// Parameters of [crate::families::straight_snspd_2pad_bilayer]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StraightSnspd2PadParams {
    pub pad_width: f64,
    pub pad_outline: f64,
    pub pad_taper_length: f64,
    pub snspd_outline: f64,
    pub snspd_width: Vec<f64>,
    pub snspd_fill: f64,
    pub snspd_area: Vec<f64>,
    pub straight_width: Vec<f64>,
    pub straight_length: Vec<f64>,
    pub snspd_layer: i16,
    pub pad_layer: i16,
    pub sheet_inductance: f64,
}
impl Default for StraightSnspd2PadParams {
    fn default() -> Self {
        Self {
            pad_width: 200.,
            pad_outline: 7.,
            pad_taper_length: 40.,
            snspd_outline: 0.2,
            snspd_width: vec![1.],
            snspd_fill: 0.5,
            snspd_area: vec![30.],
            straight_width: vec![0.1],
            straight_length: vec![50.],
            snspd_layer: 1,
            pad_layer: 2,
            sheet_inductance: 300.,
        }
    }
}
impl Sweeps for StraightSnspd2PadParams {
    fn sweeps(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("snspd_width", &self.snspd_width),
            ("snspd_area", &self.snspd_area),
            ("straight_width", &self.straight_width),
            ("straight_length", &self.straight_length),
        ]
    }
}

/// # Straight Wire with One Pad
/// Parameters of [crate::families::straight_wire_pad_bilayer]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StraightWireParams {
    pub pad_width: f64,
    pub pad_outline: f64,
    pub pad_taper_length: f64,
    pub ground_taper_length: f64,
    pub ground_taper_width: f64,
    pub straight_outline: f64,
    pub straight_width: Vec<f64>,
    pub straight_length: Vec<f64>,
    pub straight_layer: i16,
    pub pad_layer: i16,
    pub sheet_inductance: f64,
}
impl Default for StraightWireParams {
    fn default() -> Self {
        Self {
            pad_width: 200.,
            pad_outline: 7.,
            pad_taper_length: 40.,
            ground_taper_length: 10.,
            ground_taper_width: 20.,
            straight_outline: 0.2,
            straight_width: vec![0.1],
            straight_length: vec![40.],
            straight_layer: 1,
            pad_layer: 2,
            sheet_inductance: 300.,
        }
    }
}
impl Sweeps for StraightWireParams {
    fn sweeps(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("straight_width", &self.straight_width),
            ("straight_length", &self.straight_length),
        ]
    }
}

/// # Thin-Film Resistor with One Pad
/// Parameters of [crate::families::resistor_pad_bilayer]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResistorParams {
    pub pad_width: f64,
    pub pad_outline: f64,
    pub pad_taper_length: f64,
    pub ground_taper_length: f64,
    pub ground_taper_width: f64,
    /// Width of the leads
    pub straight_width: f64,
    pub straight_outline: f64,
    pub r_width: Vec<f64>,
    pub r_length: Vec<f64>,
    /// Total overlap of the leads onto the resistor
    pub r_over: f64,
    pub straight_layer: i16,
    pub pad_layer: i16,
    pub r_layer: i16,
    /// Sheet resistance, ohms per square
    pub sheet_resistance: f64,
}
impl Default for ResistorParams {
    fn default() -> Self {
        Self {
            pad_width: 200.,
            pad_outline: 7.,
            pad_taper_length: 40.,
            ground_taper_length: 20.,
            ground_taper_width: 100.,
            straight_width: 3.,
            straight_outline: 0.2,
            r_width: vec![1.],
            r_length: vec![6.],
            r_over: 2.,
            straight_layer: 1,
            pad_layer: 2,
            r_layer: 3,
            sheet_resistance: 1.,
        }
    }
}
impl Sweeps for ResistorParams {
    fn sweeps(&self) -> Vec<(&'static str, &[f64])> {
        vec![("r_width", &self.r_width), ("r_length", &self.r_length)]
    }
}

/// # Four-Point Probe Wire
/// Parameters of [crate::families::four_point_wire]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FourPointParams {
    pub pad_width: f64,
    pub pad_outline: f64,
    pub pad_taper_length: f64,
    pub straight_outline: f64,
    pub straight_width: Vec<f64>,
    pub straight_length: Vec<f64>,
    pub straight_layer: i16,
    pub pad_layer: i16,
}
impl Default for FourPointParams {
    fn default() -> Self {
        Self {
            pad_width: 200.,
            pad_outline: 10.,
            pad_taper_length: 40.,
            straight_outline: 0.2,
            straight_width: vec![0.2],
            straight_length: vec![40.],
            straight_layer: 1,
            pad_layer: 2,
        }
    }
}
impl Sweeps for FourPointParams {
    fn sweeps(&self) -> Vec<(&'static str, &[f64])> {
        vec![
            ("straight_width", &self.straight_width),
            ("straight_length", &self.straight_length),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SerializationFormat;

    #[test]
    fn defaults_fill_missing_fields() -> LayoutResult<()> {
        let p: SnspdPadParams = SerializationFormat::Yaml.from_str(
            "
            snspd_width: [0.5, 1.0]
            snspd_area: [20, 30]
            ",
        )?;
        assert_eq!(p.snspd_width, vec![0.5, 1.0]);
        assert_eq!(p.pad_width, 200.);
        assert_eq!(p.sheet_inductance, 300.);
        assert_eq!(p.sweep_len()?, 2);
        Ok(())
    }
    #[test]
    fn mismatched_sweeps() {
        let p = StraightWireParams {
            straight_width: vec![0.1, 0.2],
            ..Default::default()
        };
        match p.sweep_len() {
            Err(LayoutError::Validation { stack, .. }) => {
                assert_eq!(stack, vec![ErrorContext::Param("straight_length".into())])
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
        let empty = ResistorParams {
            r_width: vec![],
            ..Default::default()
        };
        match empty.sweep_len() {
            Err(LayoutError::Validation { stack, .. }) => {
                assert_eq!(stack, vec![ErrorContext::Param("r_width".into())])
            }
            other => panic!("expected a validation error, got {:?}", other),
        }
    }
    #[test]
    fn default_sweeps() -> LayoutResult<()> {
        assert_eq!(SnspdPadParams::default().sweep_len()?, 1);
        assert_eq!(Snspd2PadParams::default().sweep_len()?, 1);
        assert_eq!(StraightSnspdPadParams::default().sweep_len()?, 1);
        assert_eq!(StraightSnspd2PadParams::default().sweep_len()?, 1);
        assert_eq!(StraightWireParams::default().sweep_len()?, 1);
        assert_eq!(ResistorParams::default().sweep_len()?, 1);
        assert_eq!(FourPointParams::default().sweep_len()?, 1);
        Ok(())
    }
}
