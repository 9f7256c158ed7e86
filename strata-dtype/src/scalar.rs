use std::fmt::{Display, Formatter};

use crate::PhysicalType;

/// The logical scalar types a property or element identity can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ScalarType {
    /// UTF-8 text
    Utf8,
    /// Opaque bytes
    Binary,
    /// `true` or `false`
    Bool,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 32-bit IEEE float
    F32,
    /// 64-bit IEEE float
    F64,
}

impl ScalarType {
    /// The physical type a value of this type is stored as unless the schema says otherwise.
    pub const fn natural_physical(self) -> PhysicalType {
        match self {
            ScalarType::Utf8 | ScalarType::Binary => PhysicalType::Binary,
            ScalarType::Bool => PhysicalType::Boolean,
            ScalarType::I32 => PhysicalType::Int32,
            ScalarType::I64 => PhysicalType::Int64,
            ScalarType::F32 => PhysicalType::Float,
            ScalarType::F64 => PhysicalType::Double,
        }
    }

    /// Whether this is one of the integer types.
    pub const fn is_int(self) -> bool {
        matches!(self, ScalarType::I32 | ScalarType::I64)
    }

    /// Whether this is one of the floating point types.
    pub const fn is_float(self) -> bool {
        matches!(self, ScalarType::F32 | ScalarType::F64)
    }

    /// The width in bits of numeric types, `None` otherwise.
    pub const fn bit_width(self) -> Option<u8> {
        match self {
            ScalarType::I32 | ScalarType::F32 => Some(32),
            ScalarType::I64 | ScalarType::F64 => Some(64),
            ScalarType::Utf8 | ScalarType::Binary | ScalarType::Bool => None,
        }
    }
}

impl Display for ScalarType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarType::Utf8 => write!(f, "utf8"),
            ScalarType::Binary => write!(f, "binary"),
            ScalarType::Bool => write!(f, "bool"),
            ScalarType::I32 => write!(f, "i32"),
            ScalarType::I64 => write!(f, "i64"),
            ScalarType::F32 => write!(f, "f32"),
            ScalarType::F64 => write!(f, "f64"),
        }
    }
}
