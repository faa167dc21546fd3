//!
//! # Error Contexts
//!

/// Enumerated construction and export contexts.
/// Pushed and popped by tree-walkers as they descend, and reported on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    Library(String),
    Device(String),
    Instance(String),
    Port(String),
    Family(String),
    Param(String),
    Units,
    Geometry,
    Unknown,
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Library(s) => write!(f, "library `{}`", s),
            Self::Device(s) => write!(f, "device `{}`", s),
            Self::Instance(s) => write!(f, "instance `{}`", s),
            Self::Port(s) => write!(f, "port `{}`", s),
            Self::Family(s) => write!(f, "family `{}`", s),
            Self::Param(s) => write!(f, "parameter `{}`", s),
            Self::Units => write!(f, "units"),
            Self::Geometry => write!(f, "geometry"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}
