use std::fmt::{Display, Formatter};
use std::sync::Arc;

use LogicalType::*;

use crate::{CompositeId, ScalarType};

/// The logical type of an element identity or property.
///
/// A logical type says what a value means; the codec decides how many physical leaves it takes
/// and how they nest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum LogicalType {
    /// A single scalar value
    Scalar(ScalarType),
    /// A variable-length list, parameterized by a single element type
    List(Arc<LogicalType>),
    /// A map from scalar keys to values of the second type
    Map(Arc<LogicalType>, Arc<LogicalType>),
    /// An opaque composite type, converted by the converter registered for its id
    Composite(CompositeId),
}

impl LogicalType {
    /// UTF-8 text
    pub const UTF8: Self = Scalar(ScalarType::Utf8);
    /// Opaque bytes
    pub const BINARY: Self = Scalar(ScalarType::Binary);
    /// Booleans
    pub const BOOL: Self = Scalar(ScalarType::Bool);
    /// 32-bit integers
    pub const I32: Self = Scalar(ScalarType::I32);
    /// 64-bit integers
    pub const I64: Self = Scalar(ScalarType::I64);
    /// 32-bit floats
    pub const F32: Self = Scalar(ScalarType::F32);
    /// 64-bit floats
    pub const F64: Self = Scalar(ScalarType::F64);

    /// A list of `element`.
    pub fn list(element: LogicalType) -> Self {
        List(Arc::new(element))
    }

    /// A map from `key` to `value`.
    pub fn map(key: LogicalType, value: LogicalType) -> Self {
        Map(Arc::new(key), Arc::new(value))
    }

    /// A composite type with the given id.
    pub fn composite(id: impl Into<CompositeId>) -> Self {
        Composite(id.into())
    }

    /// Get the scalar type if `self` is a scalar, otherwise `None`
    pub fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            Scalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Get the inner type if `self` is a list, otherwise `None`
    pub fn as_list_element(&self) -> Option<&LogicalType> {
        match self {
            List(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Whether `self` is a list or a map.
    pub fn is_nested(&self) -> bool {
        matches!(self, List(_) | Map(..))
    }

    /// Whether `self`, or anything nested inside it, is a composite type.
    pub fn contains_composite(&self) -> bool {
        match self {
            Scalar(_) => false,
            List(e) => e.contains_composite(),
            Map(k, v) => k.contains_composite() || v.contains_composite(),
            Composite(_) => true,
        }
    }
}

impl From<ScalarType> for LogicalType {
    fn from(value: ScalarType) -> Self {
        Scalar(value)
    }
}

impl Display for LogicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar(s) => write!(f, "{s}"),
            List(e) => write!(f, "list({e})"),
            Map(k, v) => write!(f, "map({k}, {v})"),
            Composite(id) => write!(f, "composite({id})"),
        }
    }
}
