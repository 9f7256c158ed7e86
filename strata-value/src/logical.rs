use std::fmt::{Display, Formatter};
use std::sync::Arc;

use bytes::Bytes;
use itertools::Itertools;
use strata_dtype::ScalarType;
use strata_error::{StrataError, strata_err};

use crate::{CompositeObject, CompositeRef, LogicalMap};

/// A single logical item held by an element identity or property.
///
/// The set of variants is closed: every conversion site matches on it exhaustively.
#[derive(Debug, Clone)]
pub enum LogicalValue {
    /// No value. A null property converts to all-null physical leaves.
    Null,
    Utf8(String),
    Binary(Bytes),
    Bool(bool),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    List(Vec<LogicalValue>),
    Map(LogicalMap),
    Composite(CompositeRef),
}

impl LogicalValue {
    /// Wrap a composite object.
    pub fn composite<C: CompositeObject>(value: C) -> Self {
        LogicalValue::Composite(Arc::new(value))
    }

    /// Build a map value from key/value pairs.
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<LogicalValue>,
        V: Into<LogicalValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        LogicalValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LogicalValue::Null)
    }

    /// The scalar type of this value if it is a (non-null) scalar.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            LogicalValue::Utf8(_) => Some(ScalarType::Utf8),
            LogicalValue::Binary(_) => Some(ScalarType::Binary),
            LogicalValue::Bool(_) => Some(ScalarType::Bool),
            LogicalValue::I32(_) => Some(ScalarType::I32),
            LogicalValue::I64(_) => Some(ScalarType::I64),
            LogicalValue::F32(_) => Some(ScalarType::F32),
            LogicalValue::F64(_) => Some(ScalarType::F64),
            LogicalValue::Null
            | LogicalValue::List(_)
            | LogicalValue::Map(_)
            | LogicalValue::Composite(_) => None,
        }
    }

    /// A short description of the concrete type of this value, used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            LogicalValue::Null => "null".to_string(),
            LogicalValue::List(_) => "list".to_string(),
            LogicalValue::Map(_) => "map".to_string(),
            LogicalValue::Composite(c) => format!("composite({})", c.composite_id()),
            scalar => scalar
                .scalar_type()
                .map(|s| s.to_string())
                .unwrap_or_default(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LogicalValue::Utf8(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[LogicalValue]> {
        match self {
            LogicalValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&LogicalMap> {
        match self {
            LogicalValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&dyn CompositeObject> {
        match self {
            LogicalValue::Composite(c) => Some(c.as_ref()),
            _ => None,
        }
    }
}

impl PartialEq for LogicalValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LogicalValue::Null, LogicalValue::Null) => true,
            (LogicalValue::Utf8(a), LogicalValue::Utf8(b)) => a == b,
            (LogicalValue::Binary(a), LogicalValue::Binary(b)) => a == b,
            (LogicalValue::Bool(a), LogicalValue::Bool(b)) => a == b,
            (LogicalValue::I32(a), LogicalValue::I32(b)) => a == b,
            (LogicalValue::I64(a), LogicalValue::I64(b)) => a == b,
            (LogicalValue::F32(a), LogicalValue::F32(b)) => a == b,
            (LogicalValue::F64(a), LogicalValue::F64(b)) => a == b,
            (LogicalValue::List(a), LogicalValue::List(b)) => a == b,
            (LogicalValue::Map(a), LogicalValue::Map(b)) => a == b,
            (LogicalValue::Composite(a), LogicalValue::Composite(b)) => {
                a.eq_composite(b.as_ref())
            }
            _ => false,
        }
    }
}

impl Display for LogicalValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogicalValue::Null => write!(f, "null"),
            LogicalValue::Utf8(s) => write!(f, "\"{s}\""),
            LogicalValue::Binary(b) => write!(f, "<{} bytes>", b.len()),
            LogicalValue::Bool(b) => write!(f, "{b}"),
            LogicalValue::I32(v) => write!(f, "{v}i32"),
            LogicalValue::I64(v) => write!(f, "{v}i64"),
            LogicalValue::F32(v) => write!(f, "{v}f32"),
            LogicalValue::F64(v) => write!(f, "{v}f64"),
            LogicalValue::List(l) => write!(f, "[{}]", l.iter().format(", ")),
            LogicalValue::Map(m) => write!(f, "{m}"),
            LogicalValue::Composite(c) => write!(f, "composite({})", c.composite_id()),
        }
    }
}

impl From<&str> for LogicalValue {
    fn from(value: &str) -> Self {
        LogicalValue::Utf8(value.to_string())
    }
}

impl From<String> for LogicalValue {
    fn from(value: String) -> Self {
        LogicalValue::Utf8(value)
    }
}

impl From<Bytes> for LogicalValue {
    fn from(value: Bytes) -> Self {
        LogicalValue::Binary(value)
    }
}

impl From<LogicalMap> for LogicalValue {
    fn from(value: LogicalMap) -> Self {
        LogicalValue::Map(value)
    }
}

impl<T: Into<LogicalValue>> From<Vec<T>> for LogicalValue {
    fn from(value: Vec<T>) -> Self {
        LogicalValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<LogicalValue>> From<Option<T>> for LogicalValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(LogicalValue::Null)
    }
}

macro_rules! primitive_value {
    ($T:ty, $variant:ident) => {
        impl From<$T> for LogicalValue {
            fn from(value: $T) -> Self {
                LogicalValue::$variant(value)
            }
        }

        impl TryFrom<&LogicalValue> for $T {
            type Error = StrataError;

            fn try_from(value: &LogicalValue) -> Result<Self, Self::Error> {
                match value {
                    LogicalValue::$variant(v) => Ok(*v),
                    other => Err(strata_err!(
                        "Expected {} value, found {}",
                        stringify!($variant),
                        other.type_name()
                    )),
                }
            }
        }
    };
}

primitive_value!(bool, Bool);
primitive_value!(i32, I32);
primitive_value!(i64, I64);
primitive_value!(f32, F32);
primitive_value!(f64, F64);
