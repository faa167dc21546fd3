//!
//! # Meander21 SNSPD Test-Structure Layout
//!
//! Parametric generators for superconducting-nanowire test structures:
//! meander detectors, hyperbolic pad tapers, optimal steps and bends,
//! resistors, and four-point probe wires.
//!
//! Primitive generators live in [primitives], and are combined into
//! swept device [families], which are packed, documented ([doc]),
//! and exported to GDSII through [raw::Library].
//!
//! All sizes accepted by generators are in micrometers.
//!

// Internal modules & re-exports
pub use meander21raw as raw;
pub use meander21utils as utils;

pub mod primitives;
pub mod outline;
pub mod routing;
pub mod meander;
pub mod calc;
pub mod params;
pub mod families;
pub mod doc;

#[cfg(test)]
mod tests;
