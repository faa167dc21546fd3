//!
//! # Detector Estimates
//!
//! Square counts and reset times, logged as devices are generated.
//!

// Crates.io
use serde::{Deserialize, Serialize};
use tracing::info;

/// Number of squares in a square meander of `area`, to the nearest whole square.
/// `pitch` is the gap between adjacent wires.
pub fn squares_meander_calc(width: f64, area: f64, pitch: f64) -> f64 {
    ((area / (width + pitch)) * (area / width)).round()
}

/// # Reset-Time Inputs
///
/// Geometry in micrometers, sheet inductance `ls` in pH per square,
/// and load resistance `rl` in ohms.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResetTimeInput {
    pub width: f64,
    pub area: f64,
    pub pitch: f64,
    pub ls: f64,
    pub rl: f64,
    /// Square count. Computed from the meander geometry if [None].
    pub squares: Option<f64>,
}
impl Default for ResetTimeInput {
    fn default() -> Self {
        Self {
            width: 1.,
            area: 10.,
            pitch: 2.,
            ls: 80.,
            rl: 50.,
            squares: None,
        }
    }
}

/// Estimate the reset time in nanoseconds, as three kinetic-inductance time constants
pub fn reset_time_calc(input: &ResetTimeInput) -> f64 {
    let squares = match input.squares {
        Some(s) => s,
        None => squares_meander_calc(input.width, input.area, input.pitch),
    };
    let lk = input.ls * squares * 1e-3;
    let reset_time = 3. * lk / input.rl;
    info!("Squares {:.0}, reset time (ns) {:.0}", squares, reset_time);
    reset_time
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meander_squares() {
        // (10 / 3) * (10 / 1) = 33.3
        assert_eq!(squares_meander_calc(1., 10., 2.), 33.);
        assert_eq!(squares_meander_calc(1., 30., 1.), 450.);
    }
    #[test]
    fn reset_times() {
        // 80 pH/sq * 33 sq = 2.64 nH, three L/R constants into 50 ohms
        let t = reset_time_calc(&ResetTimeInput::default());
        assert!((t - 3. * 2.64 / 50.).abs() < 1e-12);
        let t = reset_time_calc(&ResetTimeInput {
            squares: Some(1000.),
            ls: 300.,
            ..Default::default()
        });
        assert!((t - 18.).abs() < 1e-12);
    }
}
