use std::fmt::{Display, Write};

use bytes::Bytes;
use strata_dtype::PhysicalType;

/// The value of a single physical leaf.
///
/// Unlike [`crate::LogicalValue`] there is no distinction between text and bytes here; both are
/// written as [`ScalarValue::Binary`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarValue {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    Float(f32),
    Double(f64),
    Binary(Bytes),
}

impl ScalarValue {
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            ScalarValue::Boolean(_) => PhysicalType::Boolean,
            ScalarValue::Int32(_) => PhysicalType::Int32,
            ScalarValue::Int64(_) => PhysicalType::Int64,
            ScalarValue::Float(_) => PhysicalType::Float,
            ScalarValue::Double(_) => PhysicalType::Double,
            ScalarValue::Binary(_) => PhysicalType::Binary,
        }
    }

    /// A binary leaf holding the UTF-8 bytes of `value`.
    pub fn utf8(value: &str) -> Self {
        ScalarValue::Binary(Bytes::copy_from_slice(value.as_bytes()))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            ScalarValue::Int32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ScalarValue::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ScalarValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScalarValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Bytes> {
        match self {
            ScalarValue::Binary(b) => Some(b),
            _ => None,
        }
    }
}

fn to_hex(slice: &[u8]) -> Result<String, std::fmt::Error> {
    let mut output = String::new();
    for byte in slice {
        write!(output, "{:02x}", byte)?;
    }
    Ok(output)
}

impl Display for ScalarValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScalarValue::Boolean(b) => write!(f, "{b}"),
            ScalarValue::Int32(v) => write!(f, "{v}i32"),
            ScalarValue::Int64(v) => write!(f, "{v}i64"),
            ScalarValue::Float(v) => write!(f, "{v}f32"),
            ScalarValue::Double(v) => write!(f, "{v}f64"),
            ScalarValue::Binary(buf) => {
                if buf.len() > 10 {
                    write!(
                        f,
                        "0x{}..{}",
                        to_hex(&buf[0..5])?,
                        to_hex(&buf[buf.len() - 5..buf.len()])?,
                    )
                } else {
                    write!(f, "0x{}", to_hex(buf)?)
                }
            }
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Boolean(value)
    }
}

impl From<i32> for ScalarValue {
    fn from(value: i32) -> Self {
        ScalarValue::Int32(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Int64(value)
    }
}

impl From<f32> for ScalarValue {
    fn from(value: f32) -> Self {
        ScalarValue::Float(value)
    }
}

impl From<f64> for ScalarValue {
    fn from(value: f64) -> Self {
        ScalarValue::Double(value)
    }
}

impl From<Bytes> for ScalarValue {
    fn from(value: Bytes) -> Self {
        ScalarValue::Binary(value)
    }
}
