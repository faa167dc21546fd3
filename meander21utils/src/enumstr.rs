//!
//! # Enum-String Pairs
//!
//! The [enumstr] macro declares a fieldless enum with one string per variant,
//! and implements [EnumStr] for conversions in both directions.
//! Used for names which arrive from parameter files and command lines,
//! such as boolean-operation names (`"A-B"`) and device-family names.
//!
//! ```rust
//! use meander21utils::{enumstr, EnumStr};
//! use serde::{Deserialize, Serialize};
//!
//! enumstr!(
//!     /// # Pad Sides
//!     Side {
//!         Left: "left",
//!         Right: "right",
//!     }
//! );
//! assert_eq!(Side::from_str("left"), Some(Side::Left));
//! assert_eq!(Side::Right.to_string(), "right");
//! assert_eq!(Side::all().len(), 2);
//! ```
//!

///
/// # String-Enumeration Trait
///
/// Primarily implemented by the [enumstr] macro.
///
pub trait EnumStr: std::marker::Sized + 'static {
    /// Convert to the paired string value
    fn to_str(&self) -> &'static str;
    /// Parse from a paired string value. Case-sensitive.
    /// Returns [None] if `txt` matches no variant.
    fn from_str(txt: &str) -> Option<Self>;
    /// All variants, in declaration order
    fn all() -> &'static [Self];
}

///
/// # Enum-String Pairing Macro
///
/// Creates a fieldless `enum` which:
/// * Implements [EnumStr] for conversions to and from its paired strings
/// * Implements [std::fmt::Display], writing those strings
/// * Derives the common traits, including `serde::{Serialize, Deserialize}`,
///   which must be in scope at the call site.
///
#[macro_export]
macro_rules! enumstr {
    (   $(#[$meta: meta])*
        $enum_name: ident {
        $( $variant: ident : $strval: literal ),* $(,)?
    }) => {
        $(#[$meta])*
        #[allow(dead_code)]
        #[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
        pub enum $enum_name {
            $( #[doc=$strval]
                $variant ),*
        }
        impl $crate::EnumStr for $enum_name {
            fn to_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $strval),*,
                }
            }
            fn from_str(txt: &str) -> Option<Self> {
                match txt {
                    $( $strval => Some(Self::$variant)),*,
                    _ => None,
                }
            }
            fn all() -> &'static [Self] {
                &[ $( Self::$variant ),* ]
            }
        }
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(f, "{}", $crate::EnumStr::to_str(self))
            }
        }
    }
}
