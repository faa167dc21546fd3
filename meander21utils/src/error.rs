//!
//! # Error-Helper Traits
//!
//! Builders and exporters carry their own context (which device, which parameter),
//! and attach it to every failure they report. [ErrorHelper] is where that context lives;
//! [Unwrapper] applies it post-fix to [Option]s and [Result]s.
//!
//! ```rust
//! use meander21utils::error::{ErrorHelper, Unwrapper};
//!
//! /// Builds one device, and names it on every failure
//! struct PadBuilder {
//!     name: String,
//! }
//! impl ErrorHelper for PadBuilder {
//!     type Error = String;
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("{}: {}", self.name, msg.into())
//!     }
//! }
//! impl PadBuilder {
//!     fn build(&self, widths: &[f64]) -> Result<f64, String> {
//!         let w = widths.first().copied().unwrapper(self, "no widths")?;
//!         self.assert(w > 0.0, "width must be positive")?;
//!         Ok(w)
//!     }
//! }
//! let b = PadBuilder { name: "pad".into() };
//! assert_eq!(b.build(&[2.0]), Ok(2.0));
//! assert_eq!(b.build(&[]), Err("pad: no widths".to_string()));
//! ```
//!

///
/// # ErrorHelper
///
/// Implementers supply `err`, which wraps a message with whatever state they carry.
/// The remaining methods are default-implemented atop it.
///
pub trait ErrorHelper {
    type Error;

    /// Create and return a [Self::Error] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Unwrap the [Option] `opt` if it is [Some], and return our error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }
    /// Unwrap the [Result] `res`, replacing any error with our own.
    fn ok<T, E>(&self, res: Result<T, E>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match res {
            Ok(val) => Ok(val),
            Err(_) => self.fail(msg),
        }
    }
    /// Assert a boolean condition. Returns through `self.fail` if it is not satisfied.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}

///
/// # Unwrapper
///
/// Post-fix form of [ErrorHelper::unwrap] and [ErrorHelper::ok].
/// Not generally implemented for new types; import it and call `unwrapper` on
/// standard-library [Option]s and [Result]s.
///
/// ```rust
/// use meander21utils::error::{ErrorHelper, Unwrapper};
///
/// fn first_port(h: &impl ErrorHelper<Error = String>, ports: &[&str]) -> Result<String, String> {
///     let p = ports.first().unwrapper(h, "device has no ports")?;
///     Ok(p.to_string())
/// }
/// ```
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper;
}

impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H>(self, helper: &H, msg: impl Into<String>) -> Result<Self::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.unwrap(self, msg)
    }
}

impl<T, E> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H>(
        self,
        helper: &H,
        msg: impl Into<String>,
    ) -> Result<<Self as Unwrapper>::Ok, H::Error>
    where
        H: ErrorHelper,
    {
        helper.ok(self, msg)
    }
}
