use std::fmt::{Display, Formatter};

use crate::ScalarType;

/// The physical type of a leaf column.
///
/// Text and bytes share the [`PhysicalType::Binary`] representation; whether a binary leaf holds
/// UTF-8 is an annotation on the leaf, not part of its physical type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PhysicalType {
    /// Single bit boolean
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 32-bit IEEE float
    Float,
    /// 64-bit IEEE float
    Double,
    /// Variable length bytes
    Binary,
}

impl PhysicalType {
    /// The width in bits of numeric types, `None` for booleans and binary.
    pub const fn bit_width(self) -> Option<u8> {
        match self {
            PhysicalType::Int32 | PhysicalType::Float => Some(32),
            PhysicalType::Int64 | PhysicalType::Double => Some(64),
            PhysicalType::Boolean | PhysicalType::Binary => None,
        }
    }

    /// Whether every value of `logical` can be stored in this physical type without loss.
    ///
    /// With `widening` disabled only the natural physical type of `logical` is accepted; with it
    /// enabled a 32-bit integer or float may also be stored in its 64-bit counterpart. Narrowing
    /// is never accepted.
    pub const fn can_store(self, logical: ScalarType, widening: bool) -> bool {
        match (logical, self) {
            (ScalarType::Utf8 | ScalarType::Binary, PhysicalType::Binary)
            | (ScalarType::Bool, PhysicalType::Boolean)
            | (ScalarType::I32, PhysicalType::Int32)
            | (ScalarType::I64, PhysicalType::Int64)
            | (ScalarType::F32, PhysicalType::Float)
            | (ScalarType::F64, PhysicalType::Double) => true,
            (ScalarType::I32, PhysicalType::Int64) | (ScalarType::F32, PhysicalType::Double) => {
                widening
            }
            _ => false,
        }
    }
}

impl Display for PhysicalType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PhysicalType::Boolean => write!(f, "boolean"),
            PhysicalType::Int32 => write!(f, "int32"),
            PhysicalType::Int64 => write!(f, "int64"),
            PhysicalType::Float => write!(f, "float"),
            PhysicalType::Double => write!(f, "double"),
            PhysicalType::Binary => write!(f, "binary"),
        }
    }
}

/// How many times a physical field may occur within its parent group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Repetition {
    /// Exactly once
    Required,
    /// Zero or one times
    #[default]
    Optional,
    /// Zero or more times
    Repeated,
}

impl Display for Repetition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Repetition::Required => write!(f, "required"),
            Repetition::Optional => write!(f, "optional"),
            Repetition::Repeated => write!(f, "repeated"),
        }
    }
}
