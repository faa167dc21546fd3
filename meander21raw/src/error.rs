//!
//! # Layout Result and Error Types
//!

// Local Imports
pub use crate::utils::{self, ErrorContext};

/// # [LayoutError] Result Type
pub type LayoutResult<T> = Result<T, LayoutError>;

///
/// # Layout Error Enumeration
///
pub enum LayoutError {
    /// Error Exporting to Foreign Format
    Export {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Error Importing from Foreign Format, e.g. parameter files
    Import {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Conversion Errors, with Boxed External Error
    Conversion {
        message: String,
        err: Box<dyn std::error::Error + Send + Sync>,
        stack: Vec<ErrorContext>,
    },
    /// Invalid parameters or geometry
    Validation {
        message: String,
        stack: Vec<ErrorContext>,
    },
    /// Boxed External Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Uncategorized Error, with String Message
    Str(String),
}
impl LayoutError {
    /// Create a [LayoutError::Str] from anything String-convertible
    pub fn msg(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }
    /// Create an error-variant [Result] of our [LayoutError::Str] variant from anything String-convertible
    pub fn fail<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::msg(s))
    }
    /// Create a [LayoutError::Validation] with an empty context stack
    pub fn validation(s: impl Into<String>) -> Self {
        Self::Validation {
            message: s.into(),
            stack: Vec::new(),
        }
    }
    /// Create an error-variant [Result] of our [LayoutError::Validation] variant
    pub fn invalid<T>(s: impl Into<String>) -> Result<T, Self> {
        Err(Self::validation(s))
    }
    /// Push context `ctx` onto our stack, if we have one.
    /// Used while unwinding through nested builders.
    pub fn context(mut self, ctx: ErrorContext) -> Self {
        match &mut self {
            Self::Export { stack, .. }
            | Self::Import { stack, .. }
            | Self::Conversion { stack, .. }
            | Self::Validation { stack, .. } => stack.push(ctx),
            Self::Str(message) => {
                return Self::Validation {
                    message: std::mem::take(message),
                    stack: vec![ctx],
                }
            }
            Self::Boxed(_) => (),
        }
        self
    }
}
impl std::fmt::Debug for LayoutError {
    /// Display a [LayoutError]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LayoutError::Export { message, stack } => {
                write!(f, "Export Error: \n - {} \n - {:?}", message, stack)
            }
            LayoutError::Import { message, stack } => {
                write!(f, "Import Error: \n - {} \n - {:?}", message, stack)
            }
            LayoutError::Conversion {
                message,
                err,
                stack,
            } => write!(
                f,
                "Conversion Error: \n - {} \n - {} \n - {:?}",
                message, err, stack
            ),
            LayoutError::Validation { message, stack } => {
                write!(f, "Validation Error: {}", message)?;
                for ctx in stack.iter() {
                    write!(f, "\n - in {}", ctx)?;
                }
                Ok(())
            }
            LayoutError::Boxed(err) => err.fmt(f),
            LayoutError::Str(err) => err.fmt(f),
        }
    }
}
impl std::fmt::Display for LayoutError {
    /// Display a [LayoutError]
    /// Delegates to the [Debug] implementation
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Boxed(e) => Some(&**e),
            Self::Conversion { err, .. } => Some(&**err),
            _ => None,
        }
    }
}

impl From<String> for LayoutError {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}
impl From<&str> for LayoutError {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}
impl From<std::num::TryFromIntError> for LayoutError {
    fn from(e: std::num::TryFromIntError) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<std::io::Error> for LayoutError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<utils::ser::Error> for LayoutError {
    fn from(e: utils::ser::Error) -> Self {
        Self::Import {
            message: e.to_string(),
            stack: Vec::new(),
        }
    }
}
impl<T: std::error::Error + Send + Sync + 'static> From<Box<T>> for LayoutError {
    fn from(e: Box<T>) -> Self {
        Self::Boxed(e)
    }
}
