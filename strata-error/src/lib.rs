#![feature(error_generic_member_access)]
#![deny(missing_docs)]

//! This crate defines error & result types for Strata.
//! It also contains a variety of useful macros for error handling.

mod ext;

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

pub use ext::*;

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

#[allow(clippy::fallible_impl_from)]
impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Where in a group's physical layout an error was raised.
///
/// Every part is optional: errors are usually created deep inside a conversion that only knows
/// the property and physical index, and the group is attached as the error propagates outwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldLocation {
    group: Option<Arc<str>>,
    property: Option<Arc<str>>,
    index: Option<usize>,
}

impl FieldLocation {
    /// A location that names nothing yet.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// A location naming only a group.
    pub fn group(group: impl Into<Arc<str>>) -> Self {
        Self {
            group: Some(group.into()),
            ..Self::default()
        }
    }

    /// A location naming a property and its first physical index.
    pub fn property(property: impl Into<Arc<str>>, index: usize) -> Self {
        Self {
            group: None,
            property: Some(property.into()),
            index: Some(index),
        }
    }

    /// Returns a copy of this location with the group set.
    pub fn with_group(mut self, group: impl Into<Arc<str>>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Returns a copy of this location with the physical index set.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// The group, if known.
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The property, if known.
    pub fn property_name(&self) -> Option<&str> {
        self.property.as_deref()
    }

    /// The physical index, if known.
    pub fn physical_index(&self) -> Option<usize> {
        self.index
    }
}

impl From<&FieldLocation> for FieldLocation {
    fn from(value: &FieldLocation) -> Self {
        value.clone()
    }
}

impl Display for FieldLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "group ")?;
        match &self.group {
            Some(group) => write!(f, "`{group}`")?,
            None => write!(f, "<unknown>")?,
        }
        if let Some(property) = &self.property {
            write!(f, ", property `{property}`")?;
        }
        if let Some(index) = self.index {
            write!(f, ", index {index}")?;
        }
        Ok(())
    }
}

/// The top-level error type for Strata.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum StrataError {
    /// A group schema cannot be resolved into a physical field layout.
    #[error("schema resolution failed ({1}): {0}\nBacktrace:\n{2}")]
    SchemaResolution(ErrString, FieldLocation, Backtrace),
    /// A logical value and its physical representation disagree in shape.
    #[error("conversion failed ({1}): {0}\nBacktrace:\n{2}")]
    Conversion(ErrString, FieldLocation, Backtrace),
    /// A value has no physical representation for the field it was written to.
    #[error("unsupported value ({1}): {0}\nBacktrace:\n{2}")]
    UnsupportedValue(ErrString, FieldLocation, Backtrace),
    /// A stream of record events violates the message protocol.
    #[error("invalid record: {0}\nBacktrace:\n{1}")]
    InvalidRecord(ErrString, Backtrace),
    /// An invalid argument was provided.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, Backtrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, Box<StrataError>),
    /// A wrapper for errors from the serde_json library.
    #[cfg(feature = "serde")]
    #[error("{0}\nBacktrace:\n{1}")]
    Json(serde_json::Error, Backtrace),
}

impl StrataError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        StrataError::Context(msg.into(), Box::new(self))
    }

    /// The innermost error, skipping any [`StrataError::Context`] wrappers.
    pub fn root(&self) -> &StrataError {
        match self {
            StrataError::Context(_, inner) => inner.root(),
            other => other,
        }
    }

    /// The location carried by this error, if it is one of the located variants.
    pub fn location(&self) -> Option<&FieldLocation> {
        match self.root() {
            StrataError::SchemaResolution(_, loc, _)
            | StrataError::Conversion(_, loc, _)
            | StrataError::UnsupportedValue(_, loc, _) => Some(loc),
            _ => None,
        }
    }

    /// Attach `group` to the error's location unless one is already present.
    pub fn in_group(self, group: &Arc<str>) -> Self {
        match self {
            StrataError::SchemaResolution(msg, loc, bt) => {
                StrataError::SchemaResolution(msg, fill_group(loc, group), bt)
            }
            StrataError::Conversion(msg, loc, bt) => {
                StrataError::Conversion(msg, fill_group(loc, group), bt)
            }
            StrataError::UnsupportedValue(msg, loc, bt) => {
                StrataError::UnsupportedValue(msg, fill_group(loc, group), bt)
            }
            StrataError::Context(msg, inner) => {
                StrataError::Context(msg, Box::new(inner.in_group(group)))
            }
            other => other,
        }
    }

    /// Whether this error (ignoring context) is a [`StrataError::SchemaResolution`].
    pub fn is_schema_resolution(&self) -> bool {
        matches!(self.root(), StrataError::SchemaResolution(..))
    }

    /// Whether this error (ignoring context) is a [`StrataError::Conversion`].
    pub fn is_conversion(&self) -> bool {
        matches!(self.root(), StrataError::Conversion(..))
    }

    /// Whether this error (ignoring context) is a [`StrataError::UnsupportedValue`].
    pub fn is_unsupported_value(&self) -> bool {
        matches!(self.root(), StrataError::UnsupportedValue(..))
    }

    /// Whether this error (ignoring context) is a [`StrataError::InvalidRecord`].
    pub fn is_invalid_record(&self) -> bool {
        matches!(self.root(), StrataError::InvalidRecord(..))
    }
}

fn fill_group(loc: FieldLocation, group: &Arc<str>) -> FieldLocation {
    if loc.group.is_some() {
        loc
    } else {
        loc.with_group(group.clone())
    }
}

impl Debug for StrataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for StrataError {
    fn from(value: serde_json::Error) -> Self {
        StrataError::Json(value, Backtrace::capture())
    }
}

/// A type alias for Results that return StrataErrors as their error type.
pub type StrataResult<T> = Result<T, StrataError>;

/// A convenient macro for creating a StrataError.
///
/// Located variants take a [`FieldLocation`] (by value or reference) after `@`:
/// `strata_err!(Conversion @ loc => "expected {} leaves", n)`.
#[macro_export]
macro_rules! strata_err {
    ($variant:ident @ $loc:expr => $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::StrataError::$variant(
            format!($fmt $(, $arg)*).into(),
            $crate::FieldLocation::from($loc),
            Backtrace::capture(),
        )
    }};
    ($variant:ident : $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::StrataError::$variant(format!($fmt $(, $arg)*).into(), Backtrace::capture())
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::strata_err!(InvalidArgument: $fmt $(, $arg)*)
    };
}

/// A convenient macro for returning a StrataError.
#[macro_export]
macro_rules! strata_bail {
    ($($tt:tt)+) => {
        return Err($crate::strata_err!($($tt)+))
    };
}
