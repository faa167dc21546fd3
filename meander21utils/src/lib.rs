//!
//! # Meander21 Internal Utilities Crate
//!
//! Shared plumbing for the layout and device crates:
//! parameter-file serialization, error helpers and contexts,
//! dependency ordering, and enum-string pairs.
//!

pub mod ser;
pub use ser::*;

pub mod error;
pub use error::*;

pub mod context;
pub use context::*;

pub mod dep_order;
pub use dep_order::*;

pub mod enumstr;
pub use enumstr::*;
