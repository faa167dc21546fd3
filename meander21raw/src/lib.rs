//!
//! # Meander21 Raw Layout
//!
//! The geometric core beneath the device library.
//! Consists of integer-coordinate shapes, named [Port]s, and [Device]s which
//! hold shapes and placed [Instance]s of other devices.
//!
//! Polygon boolean operations and offsets live in [boolean].
//! Conversion to GDSII is supported via [Library::to_gds] and [Library::save_gds].
//!

// Internal modules & re-exports
pub use meander21utils as utils;

pub mod error;
pub use error::*;

pub mod geom;
pub use geom::*;

pub mod bbox;
pub use bbox::*;

pub mod port;
pub use port::*;

pub mod data;
pub use data::*;

pub mod boolean;
pub use boolean::*;

pub mod gds;
pub use gds21;

#[cfg(test)]
mod tests;
